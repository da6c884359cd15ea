use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use query::{Name, Var, RolePlayer, Value, Property, Pattern, MatchQuery};

///! Rendering of query values into the text accepted by the interpreter.
///! Every node has exactly one rendering; lists come out in the order
///! they were built. Identifiers and string literals are written as
///! given, with no escaping.

impl Display for Name {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "${}", self.name)
    }
}

impl Display for RolePlayer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.player)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Value::String(ref s) => write!(f, "\"{}\"", s),
            Value::Other(ref s) => write!(f, "{}", s),
        }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Property::Isa(ref name) => write!(f, "isa {}", name),
            Property::Rel(ref role_players) => write!(f, "({})", role_players.iter().join(", ")),
            Property::Has(ref name, ref value) => write!(f, "has {} {}", name, value),
        }
    }
}

// An empty property list still gets the separating space: `$x ;`.
impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {};", self.var, self.properties.iter().join(" "))
    }
}

impl Display for MatchQuery {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            MatchQuery::Match(ref patterns) => write!(f, "match {}", patterns.iter().join(" ")),
            MatchQuery::Select(ref inner, ref vars) => {
                write!(f, "{} select {};", inner, vars.iter().join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use itertools::Itertools;

    use query::{Name, Var, RolePlayer, Value, Property, Pattern, MatchQuery};
    use query::{var, role, match_query};

    #[test]
    fn test_pattern_with_isa_and_has() {
        let pattern = Pattern::new(
            "x",
            vec![
                Property::Isa(Name("person".into())),
                Property::Has(Name("firstName".into()), Value::String("Alice".into())),
            ],
        );
        assert_eq!(pattern.to_string(), r#"$x isa person has firstName "Alice";"#);
    }

    #[test]
    fn test_match() {
        let query = match_query(vec![var("x").isa("person")]);
        assert_eq!(query.to_string(), "match $x isa person;");
    }

    #[test]
    fn test_select() {
        let query = match_query(vec![var("x").isa("person")]).select(vec!["x"]);
        assert_eq!(query.to_string(), "match $x isa person; select $x;");
    }

    #[test]
    fn test_relation_in_declared_order() {
        let pattern = var("m")
            .rel(vec![role("wife", "x"), role("husband", "y")])
            .isa("marriage");
        assert_eq!(pattern.to_string(), "$m (wife: $x, husband: $y) isa marriage;");
    }

    #[test]
    fn test_multiple_patterns_and_selected_vars() {
        let query = match_query(vec![
            var("x").isa("person").has("name", "Bob"),
            var("y").isa("person").has("age", 42i64),
            var("m").rel(vec![role("wife", "x"), role("husband", "y")]),
        ]).select(vec!["x", "y"]);

        assert_eq!(
            query.to_string(),
            "match $x isa person has name \"Bob\"; $y isa person has age 42; \
             $m (wife: $x, husband: $y); select $x, $y;"
        );
    }

    #[test]
    fn test_other_values_are_not_quoted() {
        assert_eq!(var("x").has("alive", true).to_string(), "$x has alive true;");
        assert_eq!(var("x").has("height", 1.75f64).to_string(), "$x has height 1.75;");
        assert_eq!(
            var("x").has("born", Value::other("2001-01-01")).to_string(),
            "$x has born 2001-01-01;"
        );
    }

    #[test]
    fn test_nested_select() {
        let query = match_query(vec![var("x").isa("person")])
            .select(vec!["x"])
            .select(vec!["x"]);
        assert_eq!(query.to_string(), "match $x isa person; select $x; select $x;");
    }

    #[test]
    fn test_degenerate_renderings() {
        assert_eq!(Pattern::new("x", vec![]).to_string(), "$x ;");
        assert_eq!(match_query(vec![]).to_string(), "match ");
        assert_eq!(
            match_query(vec![var("x").isa("person")])
                .select(Vec::<Var>::new())
                .to_string(),
            "match $x isa person; select ;"
        );
        assert_eq!(var("x").rel(vec![]).to_string(), "$x ();");
    }

    #[test]
    fn test_literals_are_not_escaped() {
        let pattern = var("x").has("name", "a\"b; c");
        assert_eq!(pattern.to_string(), "$x has name \"a\"b; c\";");
    }

    // Each part has to be found after the end of the previous one.
    fn appear_in_order<D: ToString>(text: &str, parts: &[D]) -> bool {
        let mut offset = 0;
        for part in parts.iter().map(ToString::to_string) {
            match text[offset..].find(&part) {
                Some(i) => offset += i + part.len(),
                None => return false,
            }
        }
        true
    }

    fn arb_ident() -> BoxedStrategy<String> {
        "[a-z][a-zA-Z0-9_-]{0,6}".boxed()
    }

    fn arb_value() -> BoxedStrategy<Value> {
        prop_oneof![
            "[a-zA-Z ]{0,8}".prop_map(Value::String),
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from)
        ].boxed()
    }

    prop_compose! {
        fn arb_role_player()(role in arb_ident(), player in arb_ident()) -> RolePlayer {
            RolePlayer::new(role, player)
        }
    }

    fn arb_property() -> BoxedStrategy<Property> {
        prop_oneof![
            arb_ident().prop_map(|n| Property::Isa(Name(n))),
            prop::collection::vec(arb_role_player(), 1..4).prop_map(Property::Rel),
            (arb_ident(), arb_value()).prop_map(|(n, v)| Property::Has(Name(n), v))
        ].boxed()
    }

    prop_compose! {
        fn arb_pattern()(v in arb_ident(), properties in prop::collection::vec(arb_property(), 1..5)) -> Pattern {
            Pattern::new(v, properties)
        }
    }

    prop_compose! {
        fn arb_query()(patterns in prop::collection::vec(arb_pattern(), 1..4),
                       selected in prop::collection::vec(arb_ident(), 0..4)) -> MatchQuery {
            let query = match_query(patterns);
            if selected.is_empty() {
                query
            } else {
                query.select(selected)
            }
        }
    }

    proptest! {
        #[test]
        fn test_rendering_is_deterministic(ref query in arb_query()) {
            prop_assert_eq!(query.to_string(), query.to_string());
            prop_assert_eq!(query.to_string(), query.clone().to_string());
        }

        #[test]
        fn test_patterns_render_in_order(ref query in arb_query()) {
            let text = query.to_string();
            prop_assert!(text.starts_with("match "));
            prop_assert!(appear_in_order(&text, query.patterns()));
        }

        #[test]
        fn test_properties_render_in_order(ref pattern in arb_pattern()) {
            let text = pattern.to_string();
            let prefix = format!("{} ", pattern.var());
            prop_assert!(text.starts_with(&prefix));
            prop_assert!(text.ends_with(";"));
            prop_assert!(appear_in_order(&text, pattern.properties()));
        }

        #[test]
        fn test_role_players_render_in_order(ref players in prop::collection::vec(arb_role_player(), 1..6)) {
            let text = Property::Rel(players.clone()).to_string();
            prop_assert!(text.starts_with("(") && text.ends_with(")"));
            prop_assert!(appear_in_order(&text, &players[..]));
        }

        #[test]
        fn test_selected_vars_render_in_order(ref query in arb_query(), ref vars in prop::collection::vec(arb_ident(), 1..6)) {
            let text = query.clone().select(vars.clone()).to_string();
            let expected_tail = format!(
                " select {};",
                vars.iter().map(|v| format!("${}", v)).join(", ")
            );
            prop_assert!(text.ends_with(&expected_tail));
            prop_assert!(text.starts_with(&query.to_string()));
        }
    }
}
