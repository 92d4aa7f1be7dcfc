//! Query builder - Traduce i criteri di ricerca in SQL parametrico
//!
//! I nomi di colonna arrivano solo da `FilterColumn`, tutti i valori sono parametri
//! legati con `push_bind`. La query di conteggio usa la stessa clausola WHERE della
//! query paginata, così `total_elements` conta esattamente le righe filtrate.

use crate::dtos::{FilterValue, Pageable, SearchCriteria, Tag};
use sqlx::{MySql, QueryBuilder};

/// Colonne lette per un'auto con il suo modello (inner join)
pub const AUTO_COLUMNS: &str = "a.id, a.version, a.fahrgestellnummer, a.ps, a.art, a.preis, \
     a.rabatt, a.lieferbar, a.datum, a.homepage, a.schlagwoerter, a.erzeugt, a.aktualisiert, \
     m.id AS modell_id, m.modell, m.untertitel";

pub const AUTO_FROM: &str = " FROM auto a INNER JOIN modell m ON m.auto_id = a.id";

/// Aggiunge le condizioni con `WHERE` alla prima e `AND` alle successive
struct Conditions<'q> {
    builder: &'q mut QueryBuilder<'static, MySql>,
    empty: bool,
}

impl<'q> Conditions<'q> {
    fn new(builder: &'q mut QueryBuilder<'static, MySql>) -> Self {
        Self {
            builder,
            empty: true,
        }
    }

    fn next(&mut self) -> &mut QueryBuilder<'static, MySql> {
        self.builder.push(if self.empty { " WHERE " } else { " AND " });
        self.empty = false;
        &mut *self.builder
    }
}

/// `%` e `_` del valore cercato non devono agire da jolly
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_conditions(builder: &mut QueryBuilder<'static, MySql>, criteria: &SearchCriteria) {
    let mut conditions = Conditions::new(builder);

    if let Some(modell) = &criteria.modell {
        conditions
            .next()
            .push("LOWER(m.modell) LIKE ")
            .push_bind(format!("%{}%", escape_like(&modell.to_lowercase())));
    }

    if let Some(ps) = criteria.ps {
        conditions.next().push("a.ps >= ").push_bind(ps);
    }

    if let Some(preis) = criteria.preis {
        conditions.next().push("a.preis <= ").push_bind(preis);
    }

    for tag in &criteria.tags {
        let column = match tag {
            // JAVA non deve trovare le auto che hanno solo JAVASCRIPT
            Tag::Java => "REPLACE(a.schlagwoerter, 'JAVASCRIPT', '')",
            _ => "a.schlagwoerter",
        };
        conditions
            .next()
            .push(column)
            .push(" LIKE ")
            .push_bind(format!("%{}%", tag.keyword()));
    }

    for (column, value) in &criteria.filters {
        let builder = conditions.next();
        builder.push("a.").push(column.column()).push(" = ");
        match value {
            FilterValue::Text(text) => builder.push_bind(text.clone()),
            FilterValue::Bool(flag) => builder.push_bind(*flag),
        };
    }
}

/// Query paginata: auto con modello, ordinate per id
pub fn build_search(criteria: &SearchCriteria, pageable: Pageable) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new("SELECT ");
    builder.push(AUTO_COLUMNS).push(AUTO_FROM);
    push_conditions(&mut builder, criteria);
    builder.push(" ORDER BY a.id");

    if pageable.is_paged() {
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(pageable.size))
            .push(" OFFSET ")
            .push_bind(pageable.offset() as i64);
    }
    builder
}

/// Numero di righe che soddisfano i criteri, senza paginazione
pub fn build_count(criteria: &SearchCriteria) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*)");
    builder.push(AUTO_FROM);
    push_conditions(&mut builder, criteria);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::FilterColumn;
    use rust_decimal::Decimal;

    fn where_clause(sql: &str) -> &str {
        sql.split_once(AUTO_FROM)
            .map(|(_, rest)| rest)
            .unwrap_or_default()
    }

    #[test]
    fn test_no_criteria_no_where() {
        let builder = build_search(&SearchCriteria::default(), Pageable::default());
        let sql = builder.sql();
        assert!(sql.starts_with("SELECT a.id, a.version"));
        assert_eq!(where_clause(sql), " ORDER BY a.id LIMIT ? OFFSET ?");
    }

    #[test]
    fn test_unpaged_has_no_limit() {
        let builder = build_search(&SearchCriteria::default(), Pageable::unpaged());
        assert!(builder.sql().ends_with("ORDER BY a.id"));
    }

    #[test]
    fn test_all_predicates_are_and_combined() {
        let criteria = SearchCriteria {
            modell: Some("Al".to_string()),
            ps: Some(2),
            preis: Some(Decimal::new(3000, 2)),
            tags: vec![Tag::Javascript, Tag::Java],
            filters: vec![
                (FilterColumn::Art, FilterValue::Text("SUV".to_string())),
                (FilterColumn::Lieferbar, FilterValue::Bool(true)),
            ],
        };
        let builder = build_search(&criteria, Pageable::default());

        assert_eq!(
            where_clause(builder.sql()),
            " WHERE LOWER(m.modell) LIKE ? AND a.ps >= ? AND a.preis <= ? \
             AND a.schlagwoerter LIKE ? \
             AND REPLACE(a.schlagwoerter, 'JAVASCRIPT', '') LIKE ? \
             AND a.art = ? AND a.lieferbar = ? ORDER BY a.id LIMIT ? OFFSET ?"
        );
    }

    #[test]
    fn test_count_shares_where_clause() {
        let criteria = SearchCriteria {
            ps: Some(3),
            filters: vec![(
                FilterColumn::Fahrgestellnummer,
                FilterValue::Text("WVWZZZ1JZXW000001".to_string()),
            )],
            ..Default::default()
        };
        let count = build_count(&criteria);
        assert_eq!(
            count.sql(),
            "SELECT COUNT(*) FROM auto a INNER JOIN modell m ON m.auto_id = a.id \
             WHERE a.ps >= ? AND a.fahrgestellnummer = ?"
        );

        let search = build_search(&criteria, Pageable::default());
        assert!(search.sql().contains(where_clause(count.sql())));
    }

    #[test]
    fn test_values_never_reach_the_sql_text() {
        let criteria = SearchCriteria {
            modell: Some("'; DROP TABLE auto; --".to_string()),
            ..Default::default()
        };
        let builder = build_search(&criteria, Pageable::default());
        assert!(!builder.sql().contains("DROP"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
        assert_eq!(escape_like("alpha"), "alpha");
    }
}
