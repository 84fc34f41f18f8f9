use serde::{Deserialize, Serialize};

use crate::config::AdminConfig;
use crate::controller::{ResourceController, Screen, ScreenContext};
use crate::resource::{AuditLogs, Offices, Regions, ResourceKind, Rooms};

/// Role of the signed-in user, as resolved by the shell's session layer.
#[derive(Default, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Administrator,
    InternalSupport,
    ExternalSupport,
}

impl UserRole {
    /// Support staff may browse but not create, edit or delete.
    #[must_use]
    pub const fn can_manage(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

#[derive(Default)]
pub struct Model {
    pub config: AdminConfig,
    pub role: UserRole,
    /// Screen most recently opened by the shell.
    pub active: Option<ResourceKind>,
    pub offices: ResourceController<Offices>,
    pub regions: ResourceController<Regions>,
    pub rooms: ResourceController<Rooms>,
    pub audit_logs: ResourceController<AuditLogs>,
}

impl Model {
    #[must_use]
    pub const fn screen_context(&self) -> ScreenContext {
        ScreenContext {
            config: self.config,
            can_manage: self.role.can_manage(),
        }
    }

    /// Health centers are only a reference source and have no screen.
    #[must_use]
    pub fn screen(&self, kind: ResourceKind) -> Option<&dyn Screen> {
        match kind {
            ResourceKind::Office => Some(&self.offices),
            ResourceKind::Region => Some(&self.regions),
            ResourceKind::Room => Some(&self.rooms),
            ResourceKind::AuditLog => Some(&self.audit_logs),
            ResourceKind::HealthCenter => None,
        }
    }

    pub fn screen_mut(&mut self, kind: ResourceKind) -> Option<&mut dyn Screen> {
        match kind {
            ResourceKind::Office => Some(&mut self.offices),
            ResourceKind::Region => Some(&mut self.regions),
            ResourceKind::Room => Some(&mut self.rooms),
            ResourceKind::AuditLog => Some(&mut self.audit_logs),
            ResourceKind::HealthCenter => None,
        }
    }
}
