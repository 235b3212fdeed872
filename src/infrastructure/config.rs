use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub registry: RegistrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistrySettings {
    pub host: String,
    pub token: String,
}

/// Defaults, overridden by an optional `config/service` file and then by
/// `DASHPORT_*` environment variables (`DASHPORT_REGISTRY__HOST` etc).
pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .set_default("server.listen", "0.0.0.0:8080")?
        .set_default("registry.host", "http://localhost:3000")?
        .set_default("registry.token", "")?
        .add_source(config::File::with_name("config/service").required(false))
        .add_source(config::Environment::with_prefix("DASHPORT").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
