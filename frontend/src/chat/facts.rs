//! 画像事实提取
//!
//! 对用户消息做同步的正则匹配，只识别两类自我介绍：
//! - 姓名：`me llamo X` / `mi nombre es X`
//! - 年龄：`tengo N años`

use std::sync::LazyLock;

use consultorio_shared::{ProfileFacts, Timestamp};
use regex::Regex;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:me\s+llamo|mi\s+nombre\s+es)\s+(\p{L}+)").unwrap()
});

static AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btengo\s+(\d{1,3})\s+a(?:ñ|n)os\b").unwrap());

/// 合理的年龄上限，超出视为误识别
const MAX_AGE: u32 = 120;

/// 单条消息中识别出的事实
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFacts {
    pub name: Option<String>,
    pub age: Option<u32>,
}

impl ExtractedFacts {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none()
    }
}

pub fn extract(text: &str) -> ExtractedFacts {
    let name = NAME_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let age = AGE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|age| (1..=MAX_AGE).contains(age));

    ExtractedFacts { name, age }
}

/// 把提取结果合并进已有画像
///
/// 只有内容确实变化时才返回新画像（带刷新后的时间戳）。
pub fn merge(current: &ProfileFacts, extracted: ExtractedFacts, now: Timestamp) -> Option<ProfileFacts> {
    let name = extracted.name.or_else(|| current.name.clone());
    let age = extracted.age.or(current.age);

    if name == current.name && age == current.age {
        return None;
    }

    Some(ProfileFacts {
        name,
        age,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_after_fixed_phrases() {
        assert_eq!(extract("me llamo Ana").name.as_deref(), Some("Ana"));
        assert_eq!(
            extract("Hola, mi nombre es José y estoy triste").name.as_deref(),
            Some("José")
        );
        assert_eq!(extract("ME LLAMO Luis").name.as_deref(), Some("Luis"));
        assert!(extract("me llamaron ayer").name.is_none());
    }

    #[test]
    fn extracts_age_after_fixed_phrase() {
        assert_eq!(extract("tengo 30 años").age, Some(30));
        assert_eq!(extract("Tengo 7 anos").age, Some(7));
        assert_eq!(extract("tengo 300 años").age, None);
        assert_eq!(extract("tengo 30 perros").age, None);
    }

    #[test]
    fn extracts_both_from_one_message() {
        let facts = extract("me llamo Ana y tengo 30 años");
        assert_eq!(
            facts,
            ExtractedFacts {
                name: Some("Ana".into()),
                age: Some(30)
            }
        );
    }

    #[test]
    fn merge_only_reports_changes() {
        let now = Timestamp::new(10);
        let current = ProfileFacts {
            name: Some("Ana".into()),
            age: None,
            updated_at: Timestamp::new(1),
        };

        let same = ExtractedFacts {
            name: Some("Ana".into()),
            age: None,
        };
        assert_eq!(merge(&current, same, now), None);
        assert_eq!(merge(&current, ExtractedFacts::default(), now), None);

        let older = ExtractedFacts {
            name: None,
            age: Some(30),
        };
        let merged = merge(&current, older, now).unwrap();
        assert_eq!(merged.name.as_deref(), Some("Ana"));
        assert_eq!(merged.age, Some(30));
        assert_eq!(merged.updated_at, now);
    }
}
