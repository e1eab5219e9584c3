use css::CssParserConfig;
use html::shared::{validate_limit, validate_window};
use html::{ConfigError, TokenizerConfig};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizerConfig {
    /// Remove tags the policy drops. When off, such tags are written out as
    /// escaped text instead.
    pub filter_disallowed_tags: bool,
    /// Balance the element stack: close elements left open, drop stray end
    /// tags.
    pub normalize_markup: bool,
    /// Strip `html`, `head` and `body`, and drop head-only elements.
    pub fragment_mode: bool,
    /// Characters held by each scan window.
    pub window_size: usize,
    /// Attribute values longer than this are dropped.
    pub max_attribute_value: usize,
    /// Elements open at once; deeper start tags are dropped.
    pub max_open_elements: usize,
    pub tokenizer: TokenizerConfig,
    pub css: CssParserConfig,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            filter_disallowed_tags: true,
            normalize_markup: true,
            fragment_mode: false,
            window_size: 4096,
            max_attribute_value: 16 * 1024,
            max_open_elements: 1024,
            tokenizer: TokenizerConfig::default(),
            css: CssParserConfig::default(),
        }
    }
}

impl SanitizerConfig {
    pub fn fragment() -> Self {
        Self {
            fragment_mode: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_window(self.window_size)?;
        validate_limit("max_attribute_value", self.max_attribute_value)?;
        validate_limit("max_open_elements", self.max_open_elements)?;
        self.tokenizer.validate()?;
        self.css.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(SanitizerConfig::default().validate(), Ok(()));
        assert!(SanitizerConfig::fragment().fragment_mode);
    }

    #[test]
    fn rejects_small_windows_and_zero_limits() {
        let config = SanitizerConfig {
            window_size: 16,
            ..SanitizerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WindowTooSmall { window: 16, .. })
        ));
        let config = SanitizerConfig {
            max_attribute_value: 0,
            ..SanitizerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroLimit {
                name: "max_attribute_value"
            })
        );
    }

    #[test]
    fn open_element_limit_must_be_positive() {
        let config = SanitizerConfig {
            max_open_elements: 0,
            ..SanitizerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroLimit {
                name: "max_open_elements"
            })
        );
    }

    #[test]
    fn nested_configs_are_checked() {
        let mut config = SanitizerConfig::default();
        config.css.max_properties = 0;
        assert!(config.validate().is_err());
    }
}
