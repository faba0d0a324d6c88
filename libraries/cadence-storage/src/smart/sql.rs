//! Rendering a compiled expression into `SQLite`
//!
//! Every value is bound as a parameter; the only text spliced into the
//! query comes from the closed column and join tables below.

use cadence_core::time::format_timestamp;
use cadence_core::types::UserId;
use cadence_rules::{
    fold_case, CompiledExpression, CompiledValue, Field, Join, Operator, Predicate, SongSort,
    ValueType, LIKE_ESCAPE,
};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};
use std::collections::BTreeSet;

/// Column expression a field is compared and sorted on
///
/// Text fields read their case-folded copy, so literals must be bound
/// through [`fold_case`].
pub(crate) fn column(field: Field) -> &'static str {
    match field {
        Field::SongTitle => "s.title_folded",
        Field::SongLength => "s.length",
        Field::SongTrack => "s.track",
        Field::SongDisc => "s.disc",
        Field::SongCreatedAt => "s.created_at",
        Field::SongUpdatedAt => "s.updated_at",
        Field::AlbumName => "al.name_folded",
        Field::ArtistName => "ar.name_folded",
        // No interaction row means the user never played it
        Field::InteractionPlayCount => "COALESCE(i.play_count, 0)",
        Field::InteractionUpdatedAt => "i.updated_at",
    }
}

/// `FROM songs s` plus each join once, interactions scoped to `user_id`
pub(crate) fn push_from(builder: &mut QueryBuilder<'_, Sqlite>, joins: &BTreeSet<Join>, user_id: UserId) {
    builder.push(" FROM songs s");

    for join in joins {
        match join {
            Join::Album => {
                builder.push(" INNER JOIN albums al ON al.id = s.album_id");
            }
            Join::Artist => {
                builder.push(" INNER JOIN artists ar ON ar.id = s.artist_id");
            }
            Join::Interaction => {
                builder.push(" LEFT JOIN interactions i ON i.song_id = s.id AND i.user_id = ");
                builder.push_bind(user_id.as_i64());
            }
        }
    }
}

/// `WHERE (g1) OR (g2) ...`; an empty group renders as false
pub(crate) fn push_where(
    builder: &mut QueryBuilder<'_, Sqlite>,
    expression: &CompiledExpression,
    now: DateTime<Utc>,
) {
    builder.push(" WHERE ");

    if expression.groups.is_empty() {
        builder.push("0");
        return;
    }

    for (index, group) in expression.groups.iter().enumerate() {
        if index > 0 {
            builder.push(" OR ");
        }

        if group.is_empty() {
            builder.push("0");
            continue;
        }

        builder.push("(");
        for (position, predicate) in group.predicates.iter().enumerate() {
            if position > 0 {
                builder.push(" AND ");
            }
            push_predicate(builder, predicate, now);
        }
        builder.push(")");
    }
}

/// `ORDER BY <sort>, s.id ASC`
pub(crate) fn push_order(builder: &mut QueryBuilder<'_, Sqlite>, sort: SongSort) {
    builder.push(" ORDER BY ");
    builder.push(column(sort.field));
    builder.push(" ");
    builder.push(sort.direction.as_sql());
    builder.push(", s.id ASC");
}

fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &CompiledValue) {
    match value {
        CompiledValue::Text(text) => {
            builder.push_bind(fold_case(text));
        }
        CompiledValue::Pattern(pattern) => {
            builder.push_bind(fold_case(pattern.as_str()));
        }
        CompiledValue::Number(number) => {
            builder.push_bind(*number);
        }
        CompiledValue::Instant(instant) => {
            builder.push_bind(format_timestamp(*instant));
        }
        CompiledValue::Window(window) => {
            // Windows are anchored by the caller; binding one bare is a seconds count
            builder.push_bind(window.num_seconds());
        }
    }
}

/// Positive equality; dates match on the calendar day, text ignores case
fn push_equals(builder: &mut QueryBuilder<'_, Sqlite>, field: Field, value: &CompiledValue) {
    let col = column(field);

    match field.value_type() {
        ValueType::Date => {
            builder.push(format!("date({col}) = date("));
            push_value(builder, value);
            builder.push(")");
        }
        ValueType::Text | ValueType::Number => {
            builder.push(format!("{col} = "));
            push_value(builder, value);
        }
    }
}

fn push_like(builder: &mut QueryBuilder<'_, Sqlite>, col: &str, negated: bool, value: &CompiledValue) {
    builder.push(col);
    builder.push(if negated { " NOT LIKE " } else { " LIKE " });
    push_value(builder, value);
    builder.push(format!(" ESCAPE '{LIKE_ESCAPE}'"));
}

fn window_start(now: DateTime<Utc>, value: &CompiledValue) -> DateTime<Utc> {
    match value {
        CompiledValue::Window(window) => now
            .checked_sub_signed(*window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC),
        _ => now,
    }
}

/// Negated operators also match rows where the field is absent
fn push_predicate(builder: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate, now: DateTime<Utc>) {
    if predicate.values.len() != predicate.operator.arity() {
        // Unreachable for compiled expressions; fail closed rather than widen
        tracing::warn!(
            field = predicate.field.name(),
            operator = predicate.operator.name(),
            values = predicate.values.len(),
            "predicate shape does not match operator, treating as false"
        );
        builder.push("0");
        return;
    }

    if predicate.operator.is_negated() {
        builder.push(format!("({} IS NULL OR ", column(predicate.field)));
        push_condition(builder, predicate, now);
        builder.push(")");
    } else {
        push_condition(builder, predicate, now);
    }
}

fn push_condition(builder: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate, now: DateTime<Utc>) {
    let col = column(predicate.field);

    match (predicate.operator, predicate.values.as_slice()) {
        (Operator::Is, [value]) => push_equals(builder, predicate.field, value),
        (Operator::IsNot, [value]) => {
            builder.push("NOT (");
            push_equals(builder, predicate.field, value);
            builder.push(")");
        }
        (Operator::Contains | Operator::BeginsWith | Operator::EndsWith, [value]) => {
            push_like(builder, col, false, value);
        }
        (Operator::NotContain, [value]) => push_like(builder, col, true, value),
        (Operator::IsGreaterThan, [value]) => {
            builder.push(format!("{col} > "));
            push_value(builder, value);
        }
        (Operator::IsLessThan, [value]) => {
            builder.push(format!("{col} < "));
            push_value(builder, value);
        }
        (Operator::IsBetween, [low, high]) => {
            builder.push(format!("{col} BETWEEN "));
            push_value(builder, low);
            builder.push(" AND ");
            push_value(builder, high);
        }
        (Operator::InLast, [window]) => {
            builder.push(format!("({col} >= "));
            builder.push_bind(format_timestamp(window_start(now, window)));
            builder.push(format!(" AND {col} <= "));
            builder.push_bind(format_timestamp(now));
            builder.push(")");
        }
        (Operator::NotInLast, [window]) => {
            builder.push(format!("({col} < "));
            builder.push_bind(format_timestamp(window_start(now, window)));
            builder.push(format!(" OR {col} > "));
            builder.push_bind(format_timestamp(now));
            builder.push(")");
        }
        // Arity is checked by push_predicate
        _ => {
            builder.push("0");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::types::{FieldSpec, RuleGroupRecord, RuleRecord};
    use cadence_rules::{compile_strict, SortDirection};
    use chrono::TimeZone;
    use serde_json::json;

    fn render(groups: Vec<RuleGroupRecord>) -> String {
        let expression = compile_strict(&groups, UserId::new(7)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let mut builder = QueryBuilder::new("SELECT s.id");
        push_from(&mut builder, &expression.joins, expression.user_id);
        push_where(&mut builder, &expression, now);
        builder.sql().to_string()
    }

    fn rule(field: &str, operator: &str, values: Vec<serde_json::Value>) -> RuleRecord {
        RuleRecord::new(FieldSpec::name(field), operator, values)
    }

    #[test]
    fn only_required_joins_are_rendered() {
        let sql = render(vec![RuleGroupRecord::new(vec![rule(
            "song.length",
            "isGreaterThan",
            vec![json!(60)],
        )])]);

        assert!(!sql.contains("JOIN"));
        assert!(sql.contains("s.length > ?"));
    }

    #[test]
    fn interaction_join_is_scoped_to_the_user() {
        let sql = render(vec![RuleGroupRecord::new(vec![rule(
            "interaction.play_count",
            "isGreaterThan",
            vec![json!(0)],
        )])]);

        assert!(sql.contains("LEFT JOIN interactions i ON i.song_id = s.id AND i.user_id = ?"));
        assert!(sql.contains("COALESCE(i.play_count, 0) > ?"));
    }

    #[test]
    fn groups_are_or_ed_and_empty_groups_are_false() {
        let sql = render(vec![
            RuleGroupRecord::new(vec![
                rule("song.title", "contains", vec![json!("love")]),
                rule("song.disc", "is", vec![json!(1)]),
            ]),
            RuleGroupRecord::new(vec![]),
        ]);

        assert!(sql.ends_with(
            " WHERE (s.title_folded LIKE ? ESCAPE '\\' AND s.disc = ?) OR 0"
        ));
    }

    #[test]
    fn negated_operators_admit_missing_values() {
        let sql = render(vec![RuleGroupRecord::new(vec![rule(
            "interaction.updated_at",
            "notInLast",
            vec![json!(30)],
        )])]);

        assert!(sql.contains("(i.updated_at IS NULL OR (i.updated_at < ? OR i.updated_at > ?))"));
    }

    #[test]
    fn text_fields_compare_their_folded_column() {
        let sql = render(vec![RuleGroupRecord::new(vec![
            rule("artist.name", "is", vec![json!("Björk")]),
            rule("album.name", "notContain", vec![json!("Live")]),
        ])]);

        assert!(sql.contains("ar.name_folded = ?"));
        assert!(sql.contains("(al.name_folded IS NULL OR al.name_folded NOT LIKE ? ESCAPE '\\')"));
        assert!(!sql.contains("COLLATE"));
    }

    #[test]
    fn sort_always_breaks_ties_by_id() {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT s.id FROM songs s");
        push_order(
            &mut builder,
            SongSort::new(Field::SongLength, SortDirection::Desc).unwrap(),
        );
        assert!(builder.sql().ends_with("ORDER BY s.length DESC, s.id ASC"));
    }
}
