use config::ConfigError;

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;
/// Ten years, in seconds
const MAX_TOKEN_EXPIRY: i64 = 315_360_000;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub hashing: HashingSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT signing settings.
///
/// Access and refresh tokens are signed with different secrets so a leaked
/// access key cannot mint refresh tokens.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_token_expiry: i64,  // seconds
    pub refresh_token_expiry: i64, // seconds
    pub issuer: String,
}

// Keep secrets out of debug logs
impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("access_secret", &"[redacted]")
            .field("refresh_secret", &"[redacted]")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Password hashing settings
#[derive(serde::Deserialize, Clone, Debug)]
pub struct HashingSettings {
    /// bcrypt work factor
    pub cost: u32,
}

impl Settings {
    /// Reject configurations the session core cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let jwt = &self.jwt;

        if jwt.access_secret.is_empty() || jwt.refresh_secret.is_empty() {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must be set".to_string(),
            ));
        }
        if jwt.access_secret == jwt.refresh_secret {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must differ".to_string(),
            ));
        }
        if jwt.access_token_expiry <= 0 {
            return Err(ConfigError::Message(
                "jwt.access_token_expiry must be positive".to_string(),
            ));
        }
        if jwt.refresh_token_expiry <= jwt.access_token_expiry {
            return Err(ConfigError::Message(
                "jwt.refresh_token_expiry must exceed jwt.access_token_expiry".to_string(),
            ));
        }
        if jwt.refresh_token_expiry > MAX_TOKEN_EXPIRY {
            return Err(ConfigError::Message(format!(
                "jwt.refresh_token_expiry must not exceed {} seconds",
                MAX_TOKEN_EXPIRY
            )));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.hashing.cost) {
            return Err(ConfigError::Message(format!(
                "hashing.cost must be within {}..={}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST
            )));
        }

        Ok(())
    }
}

/// Load settings from defaults, an optional `configuration` file and
/// `APP_`-prefixed environment variables (`APP_JWT__ACCESS_SECRET=...`).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("jwt.access_secret", "")?
        .set_default("jwt.refresh_secret", "")?
        .set_default("jwt.access_token_expiry", 20)?
        .set_default("jwt.refresh_token_expiry", 30)?
        .set_default("jwt.issuer", "authgate")?
        .set_default("hashing.cost", 10)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
