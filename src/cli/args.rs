use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ArgsError {
    #[error("arguments must come in `--key value` pairs, got {0} tokens")]
    OddLength(usize),
    #[error("malformed flag `{0}`: expected `--` followed by lowercase letters or `_`")]
    MalformedFlag(String),
    #[error("missing required flag `--{0}`")]
    MissingFlag(&'static str),
    #[error("invalid value `{value}` for `--{flag}`: {reason}")]
    InvalidValue {
        flag: &'static str,
        value: String,
        reason: String,
    },
}

/// `--` then a lowercase ASCII letter, then lowercase letters or `_`.
pub fn is_valid_flag(token: &str) -> bool {
    let Some(name) = token.strip_prefix("--") else {
        return false;
    };
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => chars.all(|c| c.is_ascii_lowercase() || c == '_'),
        _ => false,
    }
}

/// `--key value` pairs, keys in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagMap {
    entries: Vec<(String, String)>,
}

impl FlagMap {
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ArgsError> {
        if tokens.len() % 2 != 0 {
            return Err(ArgsError::OddLength(tokens.len()));
        }

        let mut map = FlagMap::default();
        for pair in tokens.chunks(2) {
            let flag = pair[0].as_ref();
            if !is_valid_flag(flag) {
                return Err(ArgsError::MalformedFlag(flag.to_string()));
            }
            map.insert(&flag[2..], pair[1].as_ref());
        }
        Ok(map)
    }

    /// A repeated key keeps its original position and takes the new value.
    fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn require(&self, key: &'static str) -> Result<&str, ArgsError> {
        self.get(key).ok_or(ArgsError::MissingFlag(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fps(&self) -> Result<Option<u32>, ArgsError> {
        parse_fps(self.get("fps"))
    }

    pub fn audio(&self) -> bool {
        parse_audio(self.get("audio"))
    }
}

/// Float, truncated toward zero: `"29.7"` is 29 fps.
pub fn parse_fps(value: Option<&str>) -> Result<Option<u32>, ArgsError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let invalid = |reason: &str| ArgsError::InvalidValue {
        flag: "fps",
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let parsed: f64 = value.trim().parse().map_err(|_| invalid("not a number"))?;
    if !parsed.is_finite() {
        return Err(invalid("not a finite number"));
    }
    let truncated = parsed.trunc();
    if truncated < 1.0 || truncated > u32::MAX as f64 {
        return Err(invalid("must be at least 1"));
    }
    Ok(Some(truncated as u32))
}

/// Only the literal tokens `true` and `True` enable audio.
pub fn parse_audio(value: Option<&str>) -> bool {
    matches!(value, Some("true") | Some("True"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_flag_pattern() {
        assert!(is_valid_flag("--source"));
        assert!(is_valid_flag("--target_dir"));
        assert!(is_valid_flag("--audio_codec"));
        assert!(!is_valid_flag("--Source"));
        assert!(!is_valid_flag("-source"));
        assert!(!is_valid_flag("--"));
        assert!(!is_valid_flag("--_dir"));
        assert!(!is_valid_flag("--fps2"));
        assert!(!is_valid_flag("source"));
    }

    #[test]
    fn test_parse_pairs_in_order() {
        let map = FlagMap::parse(&tokens("--source a.mp4 --target b.mp4 --fps 30")).unwrap();
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["source", "target", "fps"]);
        assert_eq!(map.get("source"), Some("a.mp4"));
        assert_eq!(map.get("target"), Some("b.mp4"));
        assert_eq!(map.get("fps"), Some("30"));
        assert_eq!(map.get("audio"), None);
    }

    #[test]
    fn test_repeated_key_keeps_first_position() {
        let map = FlagMap::parse(&tokens("--a 1 --b 2 --a 3")).unwrap();
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some("3"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_values_may_look_like_anything() {
        let map = FlagMap::parse(&tokens("--internal 0,10:0,20 --coordinates -5,0:10,10")).unwrap();
        assert_eq!(map.get("coordinates"), Some("-5,0:10,10"));
    }

    #[test]
    fn test_odd_length_rejected() {
        assert_eq!(
            FlagMap::parse(&tokens("--source a.mp4 --target")),
            Err(ArgsError::OddLength(3))
        );
        assert_eq!(FlagMap::parse(&tokens("a.mp4")), Err(ArgsError::OddLength(1)));
    }

    #[test]
    fn test_malformed_flag_rejected() {
        assert_eq!(
            FlagMap::parse(&tokens("--source a.mp4 -target b.mp4")),
            Err(ArgsError::MalformedFlag("-target".to_string()))
        );
        assert_eq!(
            FlagMap::parse(&tokens("--FPS 30")),
            Err(ArgsError::MalformedFlag("--FPS".to_string()))
        );
    }

    #[test]
    fn test_empty_is_valid() {
        let empty: Vec<String> = Vec::new();
        assert!(FlagMap::parse(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_fps_parsing() {
        assert_eq!(parse_fps(Some("29.7")), Ok(Some(29)));
        assert_eq!(parse_fps(Some("30")), Ok(Some(30)));
        assert_eq!(parse_fps(None), Ok(None));
        assert!(parse_fps(Some("fast")).is_err());
        assert!(parse_fps(Some("0.5")).is_err());
        assert!(parse_fps(Some("-3")).is_err());
        assert!(parse_fps(Some("inf")).is_err());
    }

    #[test]
    fn test_audio_parsing() {
        assert!(parse_audio(Some("true")));
        assert!(parse_audio(Some("True")));
        for value in ["false", "1", "", "TRUE", "true,", "yes"] {
            assert!(!parse_audio(Some(value)), "{:?} must not enable audio", value);
        }
        assert!(!parse_audio(None));
    }
}
