use super::Decor;

/// A parsed `.proto` file as a flat element list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proto {
    pub filename: String,
    pub elements: Vec<Element>,
    pub trailing: Vec<String>, // comments after the last element
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Syntax(Syntax),
    Package(Package),
    Import(Import),
    Option(ProtoOption),
    Enum(Enum),
    Message(Message),
    Service(Service),
}

/// `syntax = "proto3";` (or `edition = "2023";`)
#[derive(Debug, Clone, PartialEq)]
pub struct Syntax {
    pub keyword: String,
    pub value: String,
    pub decor: Decor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub decor: Decor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub filename: String,
    pub kind: ImportKind,
    pub decor: Decor,
}

impl Import {
    pub fn new(filename: impl Into<String>) -> Self {
        Self { filename: filename.into(), kind: ImportKind::Plain, decor: Decor::default() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportKind {
    #[default]
    Plain,
    Public,
    Weak,
}

/// `option name = constant;` or a `[name = constant]` field option
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoOption {
    pub name: String, // parentheses kept, e.g. `(gogoproto.nullable)`
    pub constant: Literal,
    pub decor: Decor,
}

impl ProtoOption {
    pub fn new(name: impl Into<String>, constant: Literal) -> Self {
        Self { name: name.into(), constant, decor: Decor::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Identifier, boolean or number, written as is
    Source(String),
    /// String content between quotes, escapes kept
    String(String),
    /// `{ key: value ... }` in text format
    Aggregate(Vec<(String, Literal)>),
    /// `[a, b]` inside an aggregate
    List(Vec<Literal>),
}

impl Literal {
    pub fn source(text: impl Into<String>) -> Self {
        Literal::Source(text.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Literal::String(text.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub elements: Vec<MessageElement>,
    pub decor: Decor,
    pub trailing: Vec<String>,
}

impl Message {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), elements: Vec::new(), decor: Decor::default(), trailing: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageElement {
    Field(NormalField),
    MapField(MapField),
    Oneof(Oneof),
    Message(Message),
    Enum(Enum),
    Option(ProtoOption),
    Reserved(Reserved),
    Extensions(Reserved),
}

/// Shared part of every kind of field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub sequence: Option<u32>,
    pub options: Vec<ProtoOption>,
    pub decor: Decor,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            sequence: None,
            options: Vec::new(),
            decor: Decor::default(),
        }
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_option(mut self, option: ProtoOption) -> Self {
        self.options.push(option);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalField {
    pub field: Field,
    pub label: Option<FieldLabel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    Repeated,
    Optional,
    Required,
}

impl FieldLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldLabel::Repeated => "repeated",
            FieldLabel::Optional => "optional",
            FieldLabel::Required => "required",
        }
    }
}

/// `map<K, V> name = n;`, the value type lives in `field.ty`
#[derive(Debug, Clone, PartialEq)]
pub struct MapField {
    pub key_type: String,
    pub field: Field,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Oneof {
    pub name: String,
    pub options: Vec<ProtoOption>,
    pub fields: Vec<Field>,
    pub decor: Decor,
}

/// Largest field number the wire format can carry
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// `reserved 2, 15, 9 to 11;` or `reserved "foo", "bar";`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reserved {
    pub ranges: Vec<Range>,
    pub names: Vec<String>,
    pub decor: Decor,
}

impl Reserved {
    pub fn contains(&self, number: i64) -> bool {
        self.ranges.iter().any(|range| range.contains(number))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: i64,
    pub end: RangeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    Same, // single number
    Value(i64),
    Max,
}

impl Range {
    pub fn contains(&self, number: i64) -> bool {
        match self.end {
            RangeEnd::Same => number == self.start,
            RangeEnd::Value(end) => (self.start..=end).contains(&number),
            RangeEnd::Max => number >= self.start,
        }
    }

    /// Last number covered, with `max` standing for [`MAX_FIELD_NUMBER`]
    pub fn last(&self) -> i64 {
        match self.end {
            RangeEnd::Same => self.start,
            RangeEnd::Value(end) => end,
            RangeEnd::Max => i64::from(MAX_FIELD_NUMBER),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub elements: Vec<EnumElement>,
    pub decor: Decor,
    pub trailing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumElement {
    Value(EnumValue),
    Option(ProtoOption),
    Reserved(Reserved),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub number: i64,
    pub options: Vec<ProtoOption>,
    pub decor: Decor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub elements: Vec<ServiceElement>,
    pub decor: Decor,
    pub trailing: Vec<String>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), elements: Vec::new(), decor: Decor::default(), trailing: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceElement {
    Rpc(Rpc),
    Option(ProtoOption),
}

/// `rpc Name(stream Req) returns (stream Resp) { option ...; }`
#[derive(Debug, Clone, PartialEq)]
pub struct Rpc {
    pub name: String,
    pub request: String,
    pub request_stream: bool,
    pub returns: String,
    pub returns_stream: bool,
    pub options: Vec<ProtoOption>,
    pub decor: Decor,
}

impl Rpc {
    pub fn new(name: impl Into<String>, request: impl Into<String>, returns: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request: request.into(),
            request_stream: false,
            returns: returns.into(),
            returns_stream: false,
            options: Vec::new(),
            decor: Decor::default(),
        }
    }
}
