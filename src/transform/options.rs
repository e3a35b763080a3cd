use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A name in every casing the recipes need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name {
    pub original: String,
    pub lower_camel: String,
    pub upper_camel: String,
    pub snake: String,
}

impl Name {
    pub fn new(input: &str) -> Result<Self, ConfigError> {
        let words = split_words(input);
        if words.is_empty() || !input.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-')) {
            return Err(ConfigError::InvalidName(input.to_string()));
        }
        if words[0].starts_with(|c: char| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidName(input.to_string()));
        }

        let upper_camel: String = words.iter().map(|word| capitalize(word)).collect();
        let lower_camel = words[0].clone() + &words[1..].iter().map(|word| capitalize(word)).collect::<String>();
        Ok(Self { original: input.to_string(), lower_camel, upper_camel, snake: words.join("_") })
    }
}

impl FromStr for Name {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Name::new(input)
    }
}

impl TryFrom<String> for Name {
    type Error = ConfigError;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        Name::new(&input)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.original
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Lowercase words of `fooBar`, `FooBar`, `foo_bar` or `foo-bar`
fn split_words(input: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = input.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            // `fooBar` and the `B` of `HTTPBody` start a new word
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || (prev.is_ascii_uppercase() && next_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Type of a scaffolded field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    String,
    Bool,
    Int32,
    Uint64,
    /// Another message of the module, defined in `<module>/<snake>.proto`
    Custom(String),
}

impl DataType {
    pub fn proto_type(&self) -> &str {
        match self {
            DataType::String => "string",
            DataType::Bool => "bool",
            DataType::Int32 => "int32",
            DataType::Uint64 => "uint64",
            DataType::Custom(name) => name,
        }
    }

    /// Proto file that defines the type, if it is not a scalar
    pub fn proto_import(&self, module: &str) -> Option<String> {
        match self {
            DataType::Custom(name) => Some(format!("{}/{}.proto", module, split_words(name).join("_"))),
            _ => None,
        }
    }
}

impl FromStr for DataType {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(match input {
            "" | "string" => DataType::String,
            "bool" => DataType::Bool,
            "int" | "int32" => DataType::Int32,
            "uint" | "uint64" => DataType::Uint64,
            other => {
                let custom = other.strip_prefix("custom:").unwrap_or(other);
                if !custom.starts_with(|c: char| c.is_ascii_uppercase()) {
                    return Err(ConfigError::UnknownType(input.to_string()));
                }
                DataType::Custom(custom.to_string())
            }
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proto_type())
    }
}

/// `name` or `name:type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Field {
    pub name: Name,
    pub datatype: DataType,
}

impl FromStr for Field {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (name, datatype) = input.split_once(':').unwrap_or((input, ""));
        if name.is_empty() {
            return Err(ConfigError::InvalidField(input.to_string()));
        }
        Ok(Self { name: Name::new(name)?, datatype: datatype.parse()? })
    }
}

impl TryFrom<String> for Field {
    type Error = ConfigError;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        input.parse()
    }
}

impl From<Field> for String {
    fn from(field: Field) -> Self {
        match field.datatype {
            DataType::String => field.name.original,
            DataType::Custom(name) => format!("{}:custom:{}", field.name.original, name),
            other => format!("{}:{}", field.name.original, other),
        }
    }
}

/// Ordered field list of the scaffolded type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(pub Vec<Field>);

impl Fields {
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Imports the field types need, without duplicates
    pub fn proto_imports(&self, module: &str) -> Vec<String> {
        let mut imports: Vec<String> = Vec::new();
        for import in self.iter().filter_map(|field| field.datatype.proto_import(module)) {
            if !imports.contains(&import) {
                imports.push(import);
            }
        }
        imports
    }
}

impl FromStr for Fields {
    type Err = ConfigError;

    /// Whitespace or comma separated `name:type` list
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|item| !item.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Fields)
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Read-only configuration shared by every recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub app_name: String,
    pub owner_name: String,
    #[serde(default = "default_app_path")]
    pub app_path: PathBuf,
    pub module_name: String,
    pub type_name: Name,
    #[serde(default = "default_signer")]
    pub msg_signer: Name,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub no_message: bool,
}

fn default_app_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_signer() -> Name {
    Name {
        original: "creator".to_string(),
        lower_camel: "creator".to_string(),
        upper_camel: "Creator".to_string(),
        snake: "creator".to_string(),
    }
}

impl Options {
    pub fn new(app_name: &str, owner_name: &str, module_name: &str, type_name: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            app_name: app_name.to_string(),
            owner_name: owner_name.to_string(),
            app_path: default_app_path(),
            module_name: module_name.to_string(),
            type_name: Name::new(type_name)?,
            msg_signer: default_signer(),
            fields: Fields::default(),
            no_message: false,
        })
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_signer(mut self, signer: Name) -> Self {
        self.msg_signer = signer;
        self
    }

    pub fn with_app_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.app_path = path.into();
        self
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
