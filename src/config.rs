//! Environment-sourced configuration.

use envconfig::Envconfig;

/// Runtime configuration for one invocation.
// Intentionally no Debug so credentials are not printed.
#[derive(Envconfig, Clone)]
pub struct Config {
    /// Base URL of the billing platform REST API.
    #[envconfig(from = "ALARIS_DOMAIN")]
    pub alaris_domain: String,
    /// Basic-auth user for the token exchange.
    #[envconfig(from = "ALARIS_USER")]
    pub alaris_user: String,
    /// Basic-auth password for the token exchange.
    #[envconfig(from = "PASSWORD")]
    pub alaris_password: String,
    /// Absolute URL of the enterprise reporting endpoint.
    #[envconfig(from = "ALARIS_EAPI_DOMAIN")]
    pub eapi_url: String,
    /// Static credential embedded in enterprise report requests.
    #[envconfig(from = "ALARIS_EAPI_AUTH")]
    pub eapi_auth: String,
    /// Telegram bot token.
    #[envconfig(from = "TG_TOKEN")]
    pub tg_token: String,
    /// Telegram chat that receives notifications.
    #[envconfig(from = "TG_CHAT_ID")]
    pub tg_chat_id: String,
    /// Product whose rates are zeroed by the rate command.
    #[envconfig(from = "REFERENCE_PRODUCT_ID", default = "14023")]
    pub reference_product_id: i64,
    /// Directory receiving the log file.
    #[envconfig(from = "LOG_DIR", default = ".")]
    pub log_dir: String,
    /// Log level filter, `EnvFilter` syntax.
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,
}
