use serde::{Deserialize, Serialize};

/// 站点支持的语言
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
    Tr,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Ru, Language::Tr];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Tr => "tr",
        }
    }

    /// 解析语言代码，无法识别时回退为默认语言
    pub fn from_code_or_default(code: Option<&str>) -> Self {
        code.and_then(|c| c.parse().ok()).unwrap_or_default()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            "tr" => Ok(Language::Tr),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parsing() {
        assert_eq!("RU".parse::<Language>(), Ok(Language::Ru));
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::from_code_or_default(Some("de")), Language::En);
        assert_eq!(Language::from_code_or_default(Some("tr")), Language::Tr);
        assert_eq!(Language::from_code_or_default(None), Language::En);
    }
}
