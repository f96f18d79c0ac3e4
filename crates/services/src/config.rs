use crate::error::ConfigError;

/// Default seconds allowed per question.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30;
/// Default items per page while browsing content.
pub const DEFAULT_BROWSE_PAGE_SIZE: usize = 10;
/// Default collections per page in the collection menus.
pub const DEFAULT_MENU_PAGE_SIZE: usize = 6;

/// Runtime knobs of the session engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    time_limit_secs: u32,
    browse_page_size: usize,
    menu_page_size: usize,
}

impl EngineConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::Zero` if any value is zero.
    pub fn new(
        time_limit_secs: u32,
        browse_page_size: usize,
        menu_page_size: usize,
    ) -> Result<Self, ConfigError> {
        if time_limit_secs == 0 {
            return Err(ConfigError::Zero {
                name: "time limit",
            });
        }
        if browse_page_size == 0 {
            return Err(ConfigError::Zero { name: "page size" });
        }
        if menu_page_size == 0 {
            return Err(ConfigError::Zero {
                name: "menu page size",
            });
        }
        Ok(Self {
            time_limit_secs,
            browse_page_size,
            menu_page_size,
        })
    }

    /// Read `QUIZ_TIME_LIMIT` (or the older `TIME_LIMIT`), `QUIZ_PAGE_SIZE`
    /// and `QUIZ_MENU_PAGE_SIZE`, falling back to defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable is not a positive number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `from_env` over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable is not a positive number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let time_limit = match lookup("QUIZ_TIME_LIMIT").or_else(|| lookup("TIME_LIMIT")) {
            Some(raw) => parse_var("QUIZ_TIME_LIMIT", &raw)?,
            None => DEFAULT_TIME_LIMIT_SECS,
        };
        let page_size = match lookup("QUIZ_PAGE_SIZE") {
            Some(raw) => parse_var("QUIZ_PAGE_SIZE", &raw)?,
            None => DEFAULT_BROWSE_PAGE_SIZE,
        };
        let menu_page_size = match lookup("QUIZ_MENU_PAGE_SIZE") {
            Some(raw) => parse_var("QUIZ_MENU_PAGE_SIZE", &raw)?,
            None => DEFAULT_MENU_PAGE_SIZE,
        };
        Self::new(time_limit, page_size, menu_page_size)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Zero` for a zero limit.
    pub fn with_time_limit(self, secs: u32) -> Result<Self, ConfigError> {
        Self::new(secs, self.browse_page_size, self.menu_page_size)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Zero` for a zero page size.
    pub fn with_browse_page_size(self, size: usize) -> Result<Self, ConfigError> {
        Self::new(self.time_limit_secs, size, self.menu_page_size)
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn browse_page_size(&self) -> usize {
        self.browse_page_size
    }

    #[must_use]
    pub fn menu_page_size(&self) -> usize {
        self.menu_page_size
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            browse_page_size: DEFAULT_BROWSE_PAGE_SIZE,
            menu_page_size: DEFAULT_MENU_PAGE_SIZE,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        raw: raw.to_owned(),
    })
}
