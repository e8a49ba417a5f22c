use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum LogSeverity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSeverity::Critical => write!(f, "critical"),
            LogSeverity::Warning => write!(f, "warning"),
            LogSeverity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum LogAction {
    Create,
    Read,
    Update,
    Delete,
    Other,
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogAction::Create => write!(f, "create"),
            LogAction::Read => write!(f, "read"),
            LogAction::Update => write!(f, "update"),
            LogAction::Delete => write!(f, "delete"),
            LogAction::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SubjectType {
    Guest,
    System,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectType::Guest => write!(f, "guest"),
            SubjectType::System => write!(f, "system"),
        }
    }
}
