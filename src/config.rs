use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Base URL minted share links are composed against
    /// (e.g. `https://app.example.com`).
    pub public_url: String,
    /// Origin allowed to call the management API from a browser.
    pub dashboard_origin: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let public_url = std::env::var("SHAREGATE_PUBLIC_URL")
        .unwrap_or_else(|_| "http://localhost:8080".into());

    if public_url.starts_with("http://localhost") {
        let env_mode = std::env::var("SHAREGATE_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "SHAREGATE_PUBLIC_URL still points at localhost. \
                 Minted share links would be unreachable — set the real public base URL."
            );
        }
        eprintln!("⚠️  SHAREGATE_PUBLIC_URL is not set — minted links will point at localhost.");
    }

    Ok(Config {
        port: std::env::var("SHAREGATE_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/sharegate".into()),
        public_url,
        dashboard_origin: std::env::var("DASHBOARD_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".into()),
    })
}
