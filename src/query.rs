use std::fmt::Display;

// A query looks like `match $x isa person has name "Bob"; select $x;`

/// A type, role or attribute label. Rendered verbatim.
#[derive(Serialize, Deserialize, Debug, Hash, PartialEq, Eq, Clone)]
pub struct Name(pub String);

impl<T: Into<String>> From<T> for Name {
    fn from(x: T) -> Self {
        Name(x.into())
    }
}

/// A query variable, e.g. `$x`.
#[derive(Serialize, Deserialize, Debug, Hash, PartialEq, Eq, Clone)]
pub struct Var {
    pub name: String,
}

impl Var {
    pub fn new<T: Into<String>>(name: T) -> Var {
        Var::from(name)
    }

    pub fn isa<N: Into<Name>>(self, name: N) -> Pattern {
        Pattern::new(self, vec![]).isa(name)
    }

    pub fn has<N: Into<Name>, V: Into<Value>>(self, name: N, value: V) -> Pattern {
        Pattern::new(self, vec![]).has(name, value)
    }

    pub fn rel<I: IntoIterator<Item = RolePlayer>>(self, role_players: I) -> Pattern {
        Pattern::new(self, vec![]).rel(role_players)
    }
}

impl<T: Into<String>> From<T> for Var {
    fn from(x: T) -> Self {
        Var { name: x.into() }
    }
}

/// "This variable plays this role in a relation."
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct RolePlayer {
    pub role: Name,
    pub player: Var,
}

impl RolePlayer {
    pub fn new<N: Into<Name>, V: Into<Var>>(role: N, player: V) -> RolePlayer {
        RolePlayer {
            role: role.into(),
            player: player.into(),
        }
    }
}

/// The value slot of a `has` property. A string is rendered as a quoted
/// literal; anything else is kept in its own textual form and rendered
/// as-is.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub enum Value {
    String(String),
    Other(String),
}

impl Value {
    pub fn other<D: Display>(x: D) -> Value {
        Value::Other(x.to_string())
    }
}

impl<'a> From<&'a str> for Value {
    fn from(x: &'a str) -> Self {
        Value::String(x.to_string())
    }
}

impl From<String> for Value {
    fn from(x: String) -> Self {
        Value::String(x)
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::other(x)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::other(x)
    }
}

impl From<bool> for Value {
    fn from(x: bool) -> Self {
        Value::other(x)
    }
}

/// A single assertion about a variable.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub enum Property {
    Isa(Name),
    Rel(Vec<RolePlayer>),
    Has(Name, Value),
}

/// A variable together with the properties asserted about it, in
/// document order.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Pattern {
    pub var: Var,
    pub properties: Vec<Property>,
}

impl Pattern {
    pub fn new<V: Into<Var>>(var: V, properties: Vec<Property>) -> Pattern {
        Pattern {
            var: var.into(),
            properties,
        }
    }

    pub fn var(&self) -> &Var {
        &self.var
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Appends a property, keeping the ones already present in order.
    pub fn with(mut self, property: Property) -> Pattern {
        self.properties.push(property);
        self
    }

    pub fn isa<N: Into<Name>>(self, name: N) -> Pattern {
        self.with(Property::Isa(name.into()))
    }

    pub fn has<N: Into<Name>, V: Into<Value>>(self, name: N, value: V) -> Pattern {
        self.with(Property::Has(name.into(), value.into()))
    }

    pub fn rel<I: IntoIterator<Item = RolePlayer>>(self, role_players: I) -> Pattern {
        self.with(Property::Rel(role_players.into_iter().collect()))
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub enum MatchQuery {
    Match(Vec<Pattern>),
    /// Restricts the output of the inner query to the given variables.
    Select(Box<MatchQuery>, Vec<Var>),
}

impl MatchQuery {
    pub fn select<I, V>(self, vars: I) -> MatchQuery
    where
        I: IntoIterator<Item = V>,
        V: Into<Var>,
    {
        MatchQuery::Select(Box::new(self), vars.into_iter().map(Into::into).collect())
    }

    /// The patterns at the bottom of the query, under any number of selects.
    pub fn patterns(&self) -> &[Pattern] {
        match *self {
            MatchQuery::Match(ref patterns) => patterns,
            MatchQuery::Select(ref inner, _) => inner.patterns(),
        }
    }

    /// The variables of the outermost select, if there is one.
    pub fn selected(&self) -> Option<&[Var]> {
        match *self {
            MatchQuery::Match(_) => None,
            MatchQuery::Select(_, ref vars) => Some(vars),
        }
    }
}

pub fn name<T: Into<String>>(x: T) -> Name {
    Name::from(x)
}

pub fn var<T: Into<String>>(x: T) -> Var {
    Var::from(x)
}

pub fn role<N: Into<Name>, V: Into<Var>>(role: N, player: V) -> RolePlayer {
    RolePlayer::new(role, player)
}

pub fn match_query<I: IntoIterator<Item = Pattern>>(patterns: I) -> MatchQuery {
    MatchQuery::Match(patterns.into_iter().collect())
}
