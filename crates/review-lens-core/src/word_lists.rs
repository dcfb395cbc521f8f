//! Built-in word lists.
//!
//! The stop-word list covers common Chinese function words and fillers. The
//! two category vocabularies drive both the record filter (substring test on
//! the raw comment) and token tagging (exact membership).

use std::collections::HashSet;
use std::sync::LazyLock;

/// Common Chinese function words excluded from every frequency count.
pub static BUILTIN_STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "的", "了", "和", "是", "就", "都", "而", "及", "与", "着", "之", "用", "于", "把", "等",
        "去", "又", "能", "好", "在", "或", "这", "那", "有", "很", "只", "些", "为", "呢", "啊",
        "并", "给", "跟", "还", "个", "之类", "各种", "没有", "非常", "可以", "因为", "因此",
        "所以", "但是", "但", "然后", "如果", "虽然", "这样", "这些", "那些", "如此", "只是",
        "真的", "一个",
    ]
    .into_iter()
    .collect()
});

/// Words that mark a comment as containing a suggestion.
pub const SUGGESTION_WORDS: &[&str] = &[
    "建议", "希望", "改进", "改善", "提高", "提升", "增加", "加强", "完善", "优化", "调整",
    "应该", "最好", "期待", "需要", "能否", "可否", "考虑",
];

/// Words that mark a comment as expressing a negative experience.
pub const NEGATIVE_WORDS: &[&str] = &[
    "差", "不好", "很差", "太差", "差劲", "失望", "糟糕", "不满", "不满意", "投诉", "垃圾",
    "后悔", "敷衍", "混乱", "拥挤", "浪费", "恶劣", "不行", "难吃", "坑", "脏", "乱", "贵",
    "欺骗", "态度差", "不专业", "不合理",
];
