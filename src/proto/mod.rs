//! Editable view over a `.proto` file.
//!
//! [`ProtoFile`] splits the flat element list of a parsed file into typed
//! lists so recipes can look things up and append to them by name. Printing
//! goes through [`ProtoFile::proto`], which puts the lists back together in
//! a fixed group order.

mod message;
mod service;

pub use message::Message;
pub use service::Service;

use crate::ast::proto::{self as pb, Element, Import};
use crate::error::{ParseError, ProtoError};
use crate::generate::{Generator, ProtoGenerator};
use crate::parser::{Parser, ProtoParser};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtoFile {
    pub filename: String,
    pub syntax: Option<pb::Syntax>,
    pub package: Option<pb::Package>,
    pub imports: Vec<Import>,
    pub options: Vec<pb::ProtoOption>,
    pub enums: Vec<pb::Enum>,
    pub messages: Vec<Message>,
    pub services: Vec<Service>,
    pub trailing: Vec<String>,
}

impl ProtoFile {
    pub fn parse(source: &str, filename: &str) -> Result<Self, ParseError> {
        let proto = ProtoParser::new().with_filename(filename).parse(source)?;
        Ok(Self::from_proto(proto))
    }

    pub fn from_proto(proto: pb::Proto) -> Self {
        let mut file = Self { filename: proto.filename, trailing: proto.trailing, ..Self::default() };
        for element in proto.elements {
            match element {
                Element::Syntax(syntax) => file.syntax = Some(syntax),
                Element::Package(package) => file.package = Some(package),
                Element::Import(import) => file.imports.push(import),
                Element::Option(option) => file.options.push(option),
                Element::Enum(enumeration) => file.enums.push(enumeration),
                Element::Message(message) => file.messages.push(Message::from_proto(message)),
                Element::Service(service) => file.services.push(Service::from_proto(service)),
            }
        }
        file
    }

    /// Rebuild the flat file: syntax, package, imports, options, enums,
    /// messages, services
    pub fn proto(&self) -> pb::Proto {
        let elements = self
            .syntax
            .iter()
            .cloned()
            .map(Element::Syntax)
            .chain(self.package.iter().cloned().map(Element::Package))
            .chain(self.imports.iter().cloned().map(Element::Import))
            .chain(self.options.iter().cloned().map(Element::Option))
            .chain(self.enums.iter().cloned().map(Element::Enum))
            .chain(self.messages.iter().map(|message| Element::Message(message.proto())))
            .chain(self.services.iter().map(|service| Element::Service(service.proto())))
            .collect();
        pb::Proto { filename: self.filename.clone(), elements, trailing: self.trailing.clone() }
    }

    pub fn print(&self) -> String {
        ProtoGenerator::new().generate(&self.proto())
    }

    pub fn index_of_import(&self, filename: &str) -> Option<usize> {
        self.imports.iter().position(|import| import.filename == filename)
    }

    pub fn index_of_message(&self, name: &str) -> Option<usize> {
        self.messages.iter().position(|message| message.name == name)
    }

    pub fn find_import(&self, filename: &str) -> Result<&Import, ProtoError> {
        self.imports
            .iter()
            .find(|import| import.filename == filename)
            .ok_or_else(|| ProtoError::ImportNotFound(filename.to_string()))
    }

    pub fn find_message(&self, name: &str) -> Result<&Message, ProtoError> {
        self.messages
            .iter()
            .find(|message| message.name == name)
            .ok_or_else(|| ProtoError::MessageNotFound(name.to_string()))
    }

    pub fn find_message_mut(&mut self, name: &str) -> Result<&mut Message, ProtoError> {
        self.messages
            .iter_mut()
            .find(|message| message.name == name)
            .ok_or_else(|| ProtoError::MessageNotFound(name.to_string()))
    }

    pub fn find_service(&self, name: &str) -> Result<&Service, ProtoError> {
        self.services
            .iter()
            .find(|service| service.name == name)
            .ok_or_else(|| ProtoError::ServiceNotFound(name.to_string()))
    }

    pub fn find_service_mut(&mut self, name: &str) -> Result<&mut Service, ProtoError> {
        self.services
            .iter_mut()
            .find(|service| service.name == name)
            .ok_or_else(|| ProtoError::ServiceNotFound(name.to_string()))
    }

    pub fn find_enum(&self, name: &str) -> Result<&pb::Enum, ProtoError> {
        self.enums
            .iter()
            .find(|enumeration| enumeration.name == name)
            .ok_or_else(|| ProtoError::EnumNotFound(name.to_string()))
    }

    /// Add an import at the end unless it is already there.
    ///
    /// Returns whether the import list changed.
    pub fn append_import(&mut self, filename: &str) -> bool {
        if self.index_of_import(filename).is_some() {
            return false;
        }
        self.imports.push(Import::new(filename));
        true
    }

    pub fn prepend_import(&mut self, filename: &str) -> bool {
        if self.index_of_import(filename).is_some() {
            return false;
        }
        self.imports.insert(0, Import::new(filename));
        true
    }

    pub fn remove_import_at(&mut self, idx: usize) -> Result<Import, ProtoError> {
        if idx >= self.imports.len() {
            return Err(ProtoError::IndexOutOfBounds { list: "imports", index: idx, len: self.imports.len() });
        }
        Ok(self.imports.remove(idx))
    }

    pub fn append_message(&mut self, message: Message) -> Result<&mut Message, ProtoError> {
        if self.index_of_message(&message.name).is_some() {
            return Err(ProtoError::DuplicateMessage(message.name));
        }
        self.messages.push(message);
        let last = self.messages.len() - 1;
        Ok(&mut self.messages[last])
    }

    pub fn remove_message_at(&mut self, idx: usize) -> Result<Message, ProtoError> {
        if idx >= self.messages.len() {
            return Err(ProtoError::IndexOutOfBounds { list: "messages", index: idx, len: self.messages.len() });
        }
        Ok(self.messages.remove(idx))
    }

    pub fn append_service(&mut self, service: Service) {
        self.services.push(service);
    }

    pub fn append_option(&mut self, option: pb::ProtoOption) {
        self.options.push(option);
    }
}

impl From<pb::Proto> for ProtoFile {
    fn from(proto: pb::Proto) -> Self {
        ProtoFile::from_proto(proto)
    }
}
