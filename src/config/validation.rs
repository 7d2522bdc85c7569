use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on detail workers, to stay polite with the portal
const MAX_DETAIL_WORKERS: u32 = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_regions(&config.regions)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;

    if config.listings.is_empty() {
        return Err(ConfigError::Validation(
            "listings cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates region tokens
///
/// Region tokens end up in URLs and cache file names, so only lowercase
/// ASCII letters and digits are accepted.
fn validate_regions(regions: &[String]) -> Result<(), ConfigError> {
    if regions.is_empty() {
        return Err(ConfigError::Validation(
            "at least one region is required".to_string(),
        ));
    }

    for region in regions {
        validate_region(region)?;
    }

    Ok(())
}

fn validate_region(region: &str) -> Result<(), ConfigError> {
    if region.is_empty()
        || !region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(ConfigError::Validation(format!(
            "region must be a non-empty lowercase alphanumeric token, got '{}'",
            region
        )));
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let base_url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base_url.scheme() != "http" && base_url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.city.trim().is_empty() {
        return Err(ConfigError::Validation("city cannot be empty".to_string()));
    }

    if config.detail_workers < 1 || config.detail_workers > MAX_DETAIL_WORKERS {
        return Err(ConfigError::Validation(format!(
            "detail-workers must be between 1 and {}, got {}",
            MAX_DETAIL_WORKERS, config.detail_workers
        )));
    }

    if config.detail_checkpoint_every < 1 {
        return Err(ConfigError::Validation(
            "detail-checkpoint-every must be >= 1".to_string(),
        ));
    }

    if config.page_cap == Some(0) {
        return Err(ConfigError::Validation(
            "page-cap must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the User-Agent pool
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.agents.iter().any(|agent| agent.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user agents cannot be empty strings".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingKind;
    use std::path::PathBuf;

    fn valid_config() -> Config {
        Config {
            regions: vec!["pudong".to_string(), "xuhui2".to_string()],
            listings: ListingKind::ALL.to_vec(),
            crawler: CrawlerConfig {
                base_url: "https://sh.lianjia.com".to_string(),
                city: "sh".to_string(),
                request_delay_ms: 1000,
                region_retry_delay_ms: 10_000,
                max_region_attempts: 5,
                request_timeout_secs: 30,
                page_cap: None,
                detail_workers: 1,
                detail_checkpoint_every: 10,
            },
            user_agent: UserAgentConfig::default(),
            output: OutputConfig {
                database_path: "./listings.db".to_string(),
                cache_dir: PathBuf::from(".cache"),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_region() {
        assert!(validate_region("pudong").is_ok());
        assert!(validate_region("district7").is_ok());

        assert!(validate_region("").is_err());
        assert!(validate_region("Pudong").is_err());
        assert!(validate_region("pu dong").is_err());
        assert!(validate_region("../etc").is_err());
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = valid_config();
        config.crawler.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));

        config.crawler.base_url = "ftp://sh.lianjia.com".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_rejects_out_of_range_workers() {
        let mut config = valid_config();
        config.crawler.detail_workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.detail_workers = MAX_DETAIL_WORKERS + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut config = valid_config();
        config.crawler.page_cap = Some(0);
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.crawler.detail_checkpoint_every = 0;
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.crawler.request_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_region_attempts_means_unlimited() {
        let mut config = valid_config();
        config.crawler.max_region_attempts = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_blank_user_agent() {
        let mut config = valid_config();
        config.user_agent.agents = vec!["Mozilla/5.0".to_string(), "  ".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_database_path() {
        let mut config = valid_config();
        config.output.database_path = String::new();
        assert!(validate(&config).is_err());
    }
}
