//! Environment-driven configuration, read once at startup.

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub nats_url: Option<String>,
    pub store_name: String,
    /// Virtual payment address embedded in the UPI intent.
    pub upi_vpa: String,
    pub upi_payee: String,
    /// Destination for the order-confirmation deep link, digits only or E.164.
    pub whatsapp_number: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8083),
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            nats_url: std::env::var("NATS_URL").ok(),
            store_name: env_or("STORE_NAME", "Meher Store"),
            upi_vpa: env_or("UPI_VPA", "meherstore@upi"),
            upi_payee: env_or("UPI_PAYEE", "Meher Store"),
            whatsapp_number: env_or("WHATSAPP_NUMBER", "919876543210"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
