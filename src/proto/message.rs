use crate::ast::proto::{self as pb, FieldLabel, MapField, MessageElement, NormalField, Oneof, Reserved, MAX_FIELD_NUMBER};
use crate::ast::Decor;
use crate::error::ProtoError;

/// Field numbers the protobuf runtime keeps for itself
const IMPLEMENTATION_RESERVED: std::ops::RangeInclusive<u32> = 19000..=19999;

/// A message decomposed into typed lists.
///
/// Rebuilding it with [`Message::proto`] emits options, reserved
/// declarations, nested messages, nested enums, fields, oneofs and map fields,
/// in that order. Comments travel with their element.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub decor: Decor,
    pub trailing: Vec<String>,
    options: Vec<pb::ProtoOption>,
    reserved: Vec<Reserved>,
    extensions: Vec<Reserved>,
    messages: Vec<pb::Message>,
    enums: Vec<pb::Enum>,
    fields: Vec<NormalField>,
    oneofs: Vec<Oneof>,
    maps: Vec<MapField>,
    max: u32,
}

impl Message {
    /// Empty message
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_proto(pb::Message::new(name))
    }

    pub fn from_proto(message: pb::Message) -> Self {
        let pb::Message { name, elements, decor, trailing } = message;
        let mut this = Self {
            name,
            decor,
            trailing,
            options: Vec::new(),
            reserved: Vec::new(),
            extensions: Vec::new(),
            messages: Vec::new(),
            enums: Vec::new(),
            fields: Vec::new(),
            oneofs: Vec::new(),
            maps: Vec::new(),
            max: 0,
        };
        for element in elements {
            match element {
                MessageElement::Field(field) => {
                    this.observe(&field.field);
                    this.fields.push(field);
                }
                MessageElement::MapField(map) => {
                    this.observe(&map.field);
                    this.maps.push(map);
                }
                MessageElement::Oneof(oneof) => {
                    for field in &oneof.fields {
                        this.observe(field);
                    }
                    this.oneofs.push(oneof);
                }
                MessageElement::Message(nested) => this.messages.push(nested),
                MessageElement::Enum(nested) => this.enums.push(nested),
                MessageElement::Option(option) => this.options.push(option),
                MessageElement::Reserved(reserved) => this.reserved.push(reserved),
                MessageElement::Extensions(extensions) => this.extensions.push(extensions),
            }
        }
        this
    }

    /// Highest field number seen or handed out so far
    pub fn max_sequence(&self) -> u32 {
        self.max
    }

    pub fn fields(&self) -> &[NormalField] {
        &self.fields
    }

    pub fn maps(&self) -> &[MapField] {
        &self.maps
    }

    pub fn oneofs(&self) -> &[Oneof] {
        &self.oneofs
    }

    pub fn messages(&self) -> &[pb::Message] {
        &self.messages
    }

    pub fn enums(&self) -> &[pb::Enum] {
        &self.enums
    }

    pub fn options(&self) -> &[pb::ProtoOption] {
        &self.options
    }

    pub fn index_of_field(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.field.name == name)
    }

    pub fn find_field(&self, name: &str) -> Result<&NormalField, ProtoError> {
        self.index_of_field(name)
            .map(|idx| &self.fields[idx])
            .ok_or_else(|| ProtoError::FieldNotFound { message: self.name.clone(), name: name.to_string() })
    }

    pub fn index_of_enum(&self, name: &str) -> Option<usize> {
        self.enums.iter().position(|item| item.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Result<&pb::Enum, ProtoError> {
        self.index_of_enum(name)
            .map(|idx| &self.enums[idx])
            .ok_or_else(|| ProtoError::EnumNotFound(name.to_string()))
    }

    /// Append a singular field, numbering it when it has no number yet
    pub fn append_field(&mut self, field: pb::Field) -> Result<u32, ProtoError> {
        self.append_normal_field(NormalField { field, label: None })
    }

    pub fn append_repeated_field(&mut self, field: pb::Field) -> Result<u32, ProtoError> {
        self.append_normal_field(NormalField { field, label: Some(FieldLabel::Repeated) })
    }

    pub fn append_fields(&mut self, fields: impl IntoIterator<Item = pb::Field>) -> Result<(), ProtoError> {
        for field in fields {
            self.append_field(field)?;
        }
        Ok(())
    }

    pub fn append_normal_field(&mut self, mut field: NormalField) -> Result<u32, ProtoError> {
        self.check_unique(&field.field.name)?;
        let sequence = self.assign_sequence(&mut field.field)?;
        self.fields.push(field);
        Ok(sequence)
    }

    /// Append `map<key_type, field.ty> field.name`
    pub fn append_map_field(&mut self, key_type: impl Into<String>, mut field: pb::Field) -> Result<u32, ProtoError> {
        self.check_unique(&field.name)?;
        let sequence = self.assign_sequence(&mut field)?;
        self.maps.push(MapField { key_type: key_type.into(), field });
        Ok(sequence)
    }

    /// Add a field to the oneof named `oneof`, creating the oneof when missing
    pub fn append_oneof_field(&mut self, oneof: &str, mut field: pb::Field) -> Result<u32, ProtoError> {
        self.check_unique(&field.name)?;
        let sequence = self.assign_sequence(&mut field)?;
        match self.oneofs.iter_mut().find(|item| item.name == oneof) {
            Some(existing) => existing.fields.push(field),
            None => self.oneofs.push(Oneof {
                name: oneof.to_string(),
                options: Vec::new(),
                fields: vec![field],
                decor: Decor::default(),
            }),
        }
        Ok(sequence)
    }

    pub fn find_oneof(&self, name: &str) -> Result<&Oneof, ProtoError> {
        self.oneofs
            .iter()
            .find(|oneof| oneof.name == name)
            .ok_or_else(|| ProtoError::OneofNotFound { message: self.name.clone(), name: name.to_string() })
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message.proto());
    }

    pub fn append_enum(&mut self, enumeration: pb::Enum) {
        self.enums.push(enumeration);
    }

    pub fn append_option(&mut self, option: pb::ProtoOption) {
        self.options.push(option);
    }

    /// Rebuild the flat message
    pub fn proto(&self) -> pb::Message {
        let elements = self
            .options
            .iter()
            .cloned()
            .map(MessageElement::Option)
            .chain(self.reserved.iter().cloned().map(MessageElement::Reserved))
            .chain(self.extensions.iter().cloned().map(MessageElement::Extensions))
            .chain(self.messages.iter().cloned().map(MessageElement::Message))
            .chain(self.enums.iter().cloned().map(MessageElement::Enum))
            .chain(self.fields.iter().cloned().map(MessageElement::Field))
            .chain(self.oneofs.iter().cloned().map(MessageElement::Oneof))
            .chain(self.maps.iter().cloned().map(MessageElement::MapField))
            .collect();
        pb::Message { name: self.name.clone(), elements, decor: self.decor.clone(), trailing: self.trailing.clone() }
    }

    fn observe(&mut self, field: &pb::Field) {
        if let Some(sequence) = field.sequence {
            self.max = self.max.max(sequence);
        }
    }

    fn assign_sequence(&mut self, field: &mut pb::Field) -> Result<u32, ProtoError> {
        if let Some(sequence) = field.sequence {
            self.max = self.max.max(sequence);
            return Ok(sequence);
        }
        let next = self
            .next_free()
            .ok_or_else(|| ProtoError::NoFreeSequence { message: self.name.clone() })?;
        self.max = next;
        field.sequence = Some(next);
        Ok(next)
    }

    /// First number above the mark outside every reserved range.
    ///
    /// Each step jumps past a whole range, so `reserved 2 to max` ends the
    /// search right away.
    fn next_free(&self) -> Option<u32> {
        let mut next = self.max.checked_add(1)?;
        loop {
            if next > MAX_FIELD_NUMBER {
                return None;
            }
            if IMPLEMENTATION_RESERVED.contains(&next) {
                next = IMPLEMENTATION_RESERVED.end() + 1;
                continue;
            }
            let candidate = i64::from(next);
            let covering = self
                .reserved
                .iter()
                .flat_map(|reserved| &reserved.ranges)
                .find(|range| range.contains(candidate));
            match covering {
                Some(range) => next = u32::try_from(range.last().checked_add(1)?).ok()?,
                None => return Some(next),
            }
        }
    }

    fn check_unique(&self, name: &str) -> Result<(), ProtoError> {
        let taken = self.fields.iter().any(|field| field.field.name == name)
            || self.maps.iter().any(|map| map.field.name == name)
            || self.oneofs.iter().flat_map(|oneof| &oneof.fields).any(|field| field.name == name);
        if taken {
            return Err(ProtoError::DuplicateField { message: self.name.clone(), name: name.to_string() });
        }
        Ok(())
    }
}

impl From<pb::Message> for Message {
    fn from(message: pb::Message) -> Self {
        Message::from_proto(message)
    }
}
