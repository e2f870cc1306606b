mod settings;

pub use settings::{
    AuditConfig, CacheConfig, ControlConfig, Settings, SlackConfig, load_settings,
};
