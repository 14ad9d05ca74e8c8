//! Clause assembler: linearizes a predicate list into one clause string.
//!
//! Whatever the input order, categories are emitted in SQL's syntactic order:
//!
//! ```text
//! JOIN ... WHERE (..) AND (..) GROUP BY .. HAVING .. ORDER BY .. LIMIT ? OFFSET ?
//! ```
//!
//! Within a category the caller's order is kept. Arguments are flattened in
//! exactly the order their placeholders appear in the text.

use crate::error::{OrmError, OrmResult};
use crate::ident::quote;
use crate::predicate::{Category, Predicate, count_placeholders};
use crate::value::Value;

/// Assembled clause text and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    sql: String,
    args: Vec<Value>,
}

impl Clause {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

/// Render `pred` and verify its placeholder count against its arguments.
fn checked_render(pred: &Predicate) -> OrmResult<String> {
    let sql = pred.render();
    let placeholders = count_placeholders(&sql);
    let args = pred.arg_count();
    if placeholders != args {
        return Err(OrmError::mismatch(sql, placeholders, args));
    }
    Ok(sql)
}

fn of_category<'a>(
    predicates: &'a [Predicate],
    accept: impl Fn(Category) -> bool + 'a,
) -> impl Iterator<Item = &'a Predicate> + 'a {
    predicates.iter().filter(move |p| accept(p.category()))
}

/// Assemble JOIN / WHERE / GROUP BY / HAVING / ORDER BY / LIMIT / OFFSET.
///
/// The returned text starts with a space so it can be appended directly to a
/// `... FROM table` prefix. Fails with [`OrmError::PlaceholderArgMismatch`]
/// when any fragment's `?` count differs from its argument count.
pub fn assemble(predicates: &[Predicate]) -> OrmResult<Clause> {
    let mut sql = String::from(" ");
    let mut args = Vec::new();

    // Joins
    for p in of_category(predicates, |c| c == Category::Join) {
        sql.push_str(&checked_render(p)?);
        p.extend_args(&mut args);
    }

    // Where / Or / In / Not In
    let mut conditions = Vec::new();
    for p in of_category(predicates, Category::is_condition) {
        conditions.push(format!("({})", checked_render(p)?));
        p.extend_args(&mut args);
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    // Group by
    let mut groups = Vec::new();
    for p in of_category(predicates, |c| c == Category::Group) {
        groups.push(quote(&checked_render(p)?));
        p.extend_args(&mut args);
    }
    if !groups.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&groups.join(","));
    }

    // Having
    let mut havings = Vec::new();
    for p in of_category(predicates, |c| c == Category::Having) {
        havings.push(checked_render(p)?);
        p.extend_args(&mut args);
    }
    if !havings.is_empty() {
        sql.push_str(" HAVING ");
        sql.push_str(&havings.join(" AND "));
    }

    // Order by: several orderings merge into one clause.
    let mut orders = Vec::new();
    for p in of_category(predicates, |c| c == Category::Order) {
        orders.push(checked_render(p)?);
        p.extend_args(&mut args);
    }
    if !orders.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&orders.join(", "));
    }

    // Limit before offset. Their single argument is self-generated, no check needed.
    for category in [Category::Limit, Category::Offset] {
        for p in of_category(predicates, move |c| c == category) {
            sql.push(' ');
            sql.push_str(&p.render());
            p.extend_args(&mut args);
        }
    }

    Ok(Clause { sql, args })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn placeholders(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn empty_set_is_blank() {
        let clause = assemble(&[]).unwrap();
        assert_eq!(clause.sql(), " ");
        assert!(clause.args().is_empty());
    }

    #[test]
    fn where_conditions_are_parenthesized_and_anded() {
        let clause = assemble(&[
            Predicate::filter("age > ?", args![18]),
            Predicate::where_in("id", args![1, 2]),
        ])
        .unwrap();
        assert_eq!(clause.sql(), "  WHERE (age > ?) AND (`id` IN (?,?))");
        assert_eq!(clause.args(), args![18, 1, 2].as_slice());
    }

    #[test]
    fn categories_emit_in_fixed_order() {
        let preds = vec![
            Predicate::offset(20),
            Predicate::limit(10),
            Predicate::order_by("u.name ASC"),
            Predicate::having("COUNT(*) > ?", args![2]),
            Predicate::group_by("u.id"),
            Predicate::filter("u.age > ?", args![18]),
            Predicate::inner_join("orders o", "o.user_id = u.id AND o.state = ?", args!["paid"]),
        ];
        let clause = assemble(&preds).unwrap();
        assert_eq!(
            clause.sql(),
            "  INNER JOIN orders o ON o.user_id = u.id AND o.state = ?  WHERE (u.age > ?) \
             GROUP BY `u`.`id` HAVING COUNT(*) > ? ORDER BY u.name ASC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            clause.args(),
            args!["paid", 18, 2, 10u64, 20u64].as_slice()
        );
    }

    #[test]
    fn same_category_order_is_stable() {
        let a = Predicate::filter("a = ?", args![1]);
        let b = Predicate::filter("b = ?", args![2]);
        let lim = Predicate::limit(5);

        let one = assemble(&[a.clone(), lim.clone(), b.clone()]).unwrap();
        let two = assemble(&[lim, a, b]).unwrap();
        assert_eq!(one, two);
        assert_eq!(one.sql(), "  WHERE (a = ?) AND (b = ?) LIMIT ?");
        assert_eq!(one.args(), args![1, 2, 5u64].as_slice());
    }

    #[test]
    fn multiple_orders_merge() {
        let clause = assemble(&[
            Predicate::order_by("name ASC"),
            Predicate::order_by("FIELD(id, ?)").with_args(args![7]),
        ])
        .unwrap();
        assert_eq!(clause.sql(), "  ORDER BY name ASC, FIELD(id, ?)");
        assert_eq!(clause.args(), args![7].as_slice());
    }

    #[test]
    fn multiple_groups_join_with_commas() {
        let clause = assemble(&[Predicate::group_by("a"), Predicate::group_by("t.b")]).unwrap();
        assert_eq!(clause.sql(), "  GROUP BY `a`,`t`.`b`");
    }

    #[test]
    fn having_is_not_quoted() {
        let clause = assemble(&[
            Predicate::having("total", args![]),
            Predicate::having("cnt > ?", args![1]),
        ])
        .unwrap();
        assert_eq!(clause.sql(), "  HAVING total AND cnt > ?");
    }

    #[test]
    fn mismatch_in_where_fails() {
        let err = assemble(&[Predicate::filter("a = ? AND b = ?", args![1])]).unwrap_err();
        match err {
            OrmError::PlaceholderArgMismatch {
                fragment,
                placeholders,
                args,
            } => {
                assert_eq!(fragment, "a = ? AND b = ?");
                assert_eq!(placeholders, 2);
                assert_eq!(args, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn mismatch_in_other_categories_fails() {
        for pred in [
            Predicate::inner_join("t", "t.id = ?", args![]),
            Predicate::group_by("x").with_args(args![1]),
            Predicate::having("c > ?", args![]),
            Predicate::order_by("FIELD(id, ?)"),
        ] {
            let err = assemble(&[pred]).unwrap_err();
            assert!(matches!(err, OrmError::PlaceholderArgMismatch { .. }));
        }
    }

    #[test]
    fn or_group_inside_where() {
        let clause = assemble(&[
            Predicate::eq("status", "active"),
            Predicate::or([
                Predicate::filter("a = ?", args![1]),
                Predicate::filter("b = ?", args![2]),
            ]),
        ])
        .unwrap();
        assert_eq!(
            clause.sql(),
            "  WHERE (`status` = ?) AND ((a = ?) OR (b = ?))"
        );
        assert_eq!(clause.args(), args!["active", 1, 2].as_slice());
    }

    #[test]
    fn hand_built_or_keeps_only_conditions() {
        let clause = assemble(&[Predicate::Or(vec![
            Predicate::filter("a = ?", args![1]),
            Predicate::limit(5),
            Predicate::inner_join("t", "t.id = ?", args![9]),
        ])])
        .unwrap();
        assert_eq!(clause.sql(), "  WHERE ((a = ?))");
        assert_eq!(clause.args(), args![1].as_slice());
    }

    #[test]
    fn args_always_match_placeholders() {
        let sets: Vec<Vec<Predicate>> = vec![
            vec![],
            vec![Predicate::where_in("x", Vec::<i64>::new())],
            vec![
                Predicate::left_join("r", "r.id = u.rid", args![]),
                Predicate::where_not_in("u.id", [1, 2, 3]),
                Predicate::or_where("a = ? OR b = ?", args![1, 2]),
                Predicate::having("sum(x) > ?", args![10]),
                Predicate::limit(1),
                Predicate::offset(2),
            ],
            vec![Predicate::contains("name", "x"), Predicate::find_in_set("t", 1)],
        ];
        for preds in sets {
            let clause = assemble(&preds).unwrap();
            assert_eq!(placeholders(clause.sql()), clause.args().len());
        }
    }
}
