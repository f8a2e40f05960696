use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid alignment '{0}'")]
pub struct ParseAlignError(String);

/// Horizontal placement of the OSD on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical placement of the OSD on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

impl HAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
        }
    }
}

impl VAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            VAlign::Top => "top",
            VAlign::Center => "center",
            VAlign::Bottom => "bottom",
        }
    }
}

impl FromStr for HAlign {
    type Err = ParseAlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(HAlign::Left),
            "center" => Ok(HAlign::Center),
            "right" => Ok(HAlign::Right),
            _ => Err(ParseAlignError(s.to_string())),
        }
    }
}

impl FromStr for VAlign {
    type Err = ParseAlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(VAlign::Top),
            "center" => Ok(VAlign::Center),
            "bottom" => Ok(VAlign::Bottom),
            _ => Err(ParseAlignError(s.to_string())),
        }
    }
}

impl fmt::Display for HAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("LEFT".parse::<HAlign>().unwrap(), HAlign::Left);
        assert_eq!(" Right ".parse::<HAlign>().unwrap(), HAlign::Right);
        assert_eq!("Bottom".parse::<VAlign>().unwrap(), VAlign::Bottom);
    }

    #[test]
    fn test_axes_do_not_share_values() {
        assert!("top".parse::<HAlign>().is_err());
        assert!("left".parse::<VAlign>().is_err());
        assert_eq!("center".parse::<VAlign>().unwrap(), VAlign::Center);
    }

    #[test]
    fn test_defaults_are_centered() {
        assert_eq!(HAlign::default(), HAlign::Center);
        assert_eq!(VAlign::default(), VAlign::Center);
    }
}
