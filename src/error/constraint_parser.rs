use std::sync::OnceLock;

use regex::Regex;

/// Tables created by the migrations, longest first so that
/// `blog_post_tags` wins over `blog_posts` when matching constraint prefixes.
const KNOWN_TABLES: &[&str] = &[
    "credit_service_prices",
    "invitation_relations",
    "article_edit_tasks",
    "commission_records",
    "blog_seo_keywords",
    "invitation_codes",
    "credit_products",
    "credit_records",
    "blog_post_tags",
    "blog_posts",
    "blog_tags",
    "templates",
    "ai_tasks",
    "trades",
    "users",
];

/// Suffixes PostgreSQL appends to generated constraint names.
const CONSTRAINT_SUFFIXES: &[&str] = &["_key", "_fkey", "_pkey", "_check", "_idx"];

/// Parses PostgreSQL constraint violation messages into entity/field/value parts.
pub struct ConstraintParser;

struct RegexPatterns {
    key_value: Regex,
    column_name: Regex,
    table_name: Regex,
}

static REGEX_PATTERNS: OnceLock<Option<RegexPatterns>> = OnceLock::new();

fn patterns() -> Option<&'static RegexPatterns> {
    REGEX_PATTERNS
        .get_or_init(|| {
            Some(RegexPatterns {
                key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").ok()?,
                column_name: Regex::new(r#"column "([^"]+)""#).ok()?,
                table_name: Regex::new(r#"(?:table|relation) "([^"]+)""#).ok()?,
            })
        })
        .as_ref()
}

impl ConstraintParser {
    /// Parses a unique violation into `(entity, field, value)`.
    ///
    /// ```ignore
    /// let msg = "duplicate key value violates unique constraint \"blog_posts_slug_key\"\n\
    ///            DETAIL: Key (slug)=(hello) already exists.";
    /// assert_eq!(
    ///     ConstraintParser::parse_unique_violation(msg, Some("blog_posts_slug_key")),
    ///     Some(("blog_posts".into(), "slug".into(), "hello".into()))
    /// );
    /// ```
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let detail = Self::extract_key_value_from_message(message);
        let from_constraint = constraint_name.and_then(Self::parse_constraint_name);

        match (from_constraint, detail) {
            (Some((entity, _)), Some((field, value))) => Some((entity, field, value)),
            (Some((entity, field)), None) => Some((entity, field, "duplicate_value".to_string())),
            (None, Some((field, value))) => {
                let entity = Self::extract_table_from_message(message)
                    .unwrap_or_else(|| "resource".to_string());
                Some((entity, field, value))
            }
            (None, None) => None,
        }
    }

    /// Parses a not-null violation into `(entity, field)`.
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = Self::extract_column_from_message(message)?;
        let entity = Self::extract_table_from_message(message)
            .or_else(|| {
                constraint_name.and_then(|c| Self::parse_constraint_name(c).map(|(e, _)| e))
            })
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Parses a foreign key violation into `(entity, field, referenced_value)`.
    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let detail = Self::extract_key_value_from_message(message);

        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = detail
                .map(|(_, v)| v)
                .unwrap_or_else(|| "invalid_reference".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = detail?;
        let entity =
            Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Parses a check violation into `(entity, field)`.
    pub fn parse_check_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        if let Some(parsed) = constraint_name.and_then(Self::parse_constraint_name) {
            return Some(parsed);
        }

        let field = Self::extract_column_from_message(message)?;
        let entity =
            Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Splits a generated constraint name into `(table, column)`.
    ///
    /// Known table names are matched as prefixes first, so multi-word tables
    /// such as `commission_records` are not split on their inner underscore.
    /// Unknown names fall back to "first segment is the table".
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint_name.strip_suffix(suffix))
            .unwrap_or(constraint_name);

        for table in KNOWN_TABLES {
            if let Some(rest) = stem.strip_prefix(table).and_then(|r| r.strip_prefix('_')) {
                if !rest.is_empty() {
                    return Some((table.to_string(), rest.to_string()));
                }
            }
        }

        let (entity, field) = stem.split_once('_')?;
        if entity.is_empty() || field.is_empty() {
            return None;
        }
        Some((entity.to_string(), field.to_string()))
    }

    /// Extracts `(field, value)` from a `Key (field)=(value)` detail line.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        let caps = patterns()?.key_value.captures(message)?;
        Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
    }

    /// Extracts the quoted column name from a message.
    pub fn extract_column_from_message(message: &str) -> Option<String> {
        let caps = patterns()?.column_name.captures(message)?;
        Some(caps.get(1)?.as_str().to_string())
    }

    /// Extracts the quoted table or relation name from a message.
    pub fn extract_table_from_message(message: &str) -> Option<String> {
        let caps = patterns()?.table_name.captures(message)?;
        Some(caps.get(1)?.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constraint_name_multi_word_table() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("invitation_codes_code_key"),
            Some(("invitation_codes".to_string(), "code".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("commission_records_relation_id_fkey"),
            Some(("commission_records".to_string(), "relation_id".to_string()))
        );
    }

    #[test]
    fn test_parse_constraint_name_prefers_longest_table() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("blog_post_tags_tag_id_fkey"),
            Some(("blog_post_tags".to_string(), "tag_id".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("blog_posts_slug_key"),
            Some(("blog_posts".to_string(), "slug".to_string()))
        );
    }

    #[test]
    fn test_parse_constraint_name_unknown_table() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("widgets_color_check"),
            Some(("widgets".to_string(), "color".to_string()))
        );
        assert_eq!(ConstraintParser::parse_constraint_name("nounderscore"), None);
    }

    #[test]
    fn test_parse_unique_violation_uses_detail_field() {
        let message = "duplicate key value violates unique constraint \"users_email_key\"\nDETAIL: Key (email)=(a@b.io) already exists.";
        assert_eq!(
            ConstraintParser::parse_unique_violation(message, Some("users_email_key")),
            Some(("users".to_string(), "email".to_string(), "a@b.io".to_string()))
        );
    }

    #[test]
    fn test_parse_unique_violation_without_constraint() {
        let message = "duplicate key value violates unique constraint\nDETAIL: Key (trade_no)=(T1) already exists.";
        assert_eq!(
            ConstraintParser::parse_unique_violation(message, None),
            Some(("resource".to_string(), "trade_no".to_string(), "T1".to_string()))
        );
    }

    #[test]
    fn test_parse_not_null_violation_reads_relation() {
        let message =
            "null value in column \"title\" of relation \"blog_posts\" violates not-null constraint";
        assert_eq!(
            ConstraintParser::parse_not_null_violation(message, None),
            Some(("blog_posts".to_string(), "title".to_string()))
        );
    }

    #[test]
    fn test_parse_foreign_key_violation() {
        let message = "insert or update on table \"trades\" violates foreign key constraint \"trades_user_id_fkey\"\nDETAIL: Key (user_id)=(u_missing) is not present in table \"users\".";
        assert_eq!(
            ConstraintParser::parse_foreign_key_violation(message, Some("trades_user_id_fkey")),
            Some((
                "trades".to_string(),
                "user_id".to_string(),
                "u_missing".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_check_violation_falls_back_to_message() {
        let message = "new row for relation \"users\" violates check constraint on column \"credits\"";
        assert_eq!(
            ConstraintParser::parse_check_violation(message, None),
            Some(("users".to_string(), "credits".to_string()))
        );
    }
}
