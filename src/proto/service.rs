use crate::ast::proto::{self as pb, Rpc, ServiceElement};
use crate::ast::Decor;
use crate::error::ProtoError;

/// A service split into its options and procedures
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub decor: Decor,
    pub trailing: Vec<String>,
    options: Vec<pb::ProtoOption>,
    procedures: Vec<Rpc>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_proto(pb::Service::new(name))
    }

    pub fn from_proto(service: pb::Service) -> Self {
        let pb::Service { name, elements, decor, trailing } = service;
        let mut options = Vec::new();
        let mut procedures = Vec::new();
        for element in elements {
            match element {
                ServiceElement::Rpc(rpc) => procedures.push(rpc),
                ServiceElement::Option(option) => options.push(option),
            }
        }
        Self { name, decor, trailing, options, procedures }
    }

    pub fn rpcs(&self) -> &[Rpc] {
        &self.procedures
    }

    pub fn index_of_rpc(&self, name: &str) -> Option<usize> {
        self.procedures.iter().position(|rpc| rpc.name == name)
    }

    pub fn find_rpc(&self, name: &str) -> Result<&Rpc, ProtoError> {
        self.index_of_rpc(name)
            .map(|idx| &self.procedures[idx])
            .ok_or_else(|| ProtoError::RpcNotFound { service: self.name.clone(), name: name.to_string() })
    }

    pub fn append_rpc(&mut self, rpc: Rpc) -> Result<(), ProtoError> {
        if self.index_of_rpc(&rpc.name).is_some() {
            return Err(ProtoError::DuplicateRpc { service: self.name.clone(), name: rpc.name });
        }
        self.procedures.push(rpc);
        Ok(())
    }

    /// Append in order, stopping at the first duplicate
    pub fn append_rpcs(&mut self, rpcs: impl IntoIterator<Item = Rpc>) -> Result<(), ProtoError> {
        rpcs.into_iter().try_for_each(|rpc| self.append_rpc(rpc))
    }

    pub fn remove_rpc_at(&mut self, idx: usize) -> Result<Rpc, ProtoError> {
        if idx >= self.procedures.len() {
            return Err(ProtoError::IndexOutOfBounds { list: "rpcs", index: idx, len: self.procedures.len() });
        }
        Ok(self.procedures.remove(idx))
    }

    pub fn append_option(&mut self, option: pb::ProtoOption) {
        self.options.push(option);
    }

    /// Options first, then procedures
    pub fn proto(&self) -> pb::Service {
        let elements = self
            .options
            .iter()
            .cloned()
            .map(ServiceElement::Option)
            .chain(self.procedures.iter().cloned().map(ServiceElement::Rpc))
            .collect();
        pb::Service { name: self.name.clone(), elements, decor: self.decor.clone(), trailing: self.trailing.clone() }
    }
}

impl From<pb::Service> for Service {
    fn from(service: pb::Service) -> Self {
        Service::from_proto(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_find() {
        let mut service = Service::new("Msg");
        service
            .append_rpcs([
                Rpc::new("CreatePost", "MsgCreatePost", "MsgCreatePostResponse"),
                Rpc::new("UpdatePost", "MsgUpdatePost", "MsgUpdatePostResponse"),
            ])
            .unwrap();
        assert_eq!(service.index_of_rpc("UpdatePost"), Some(1));
        assert_eq!(service.find_rpc("CreatePost").unwrap().returns, "MsgCreatePostResponse");
        assert_eq!(
            service.find_rpc("DeletePost").unwrap_err(),
            ProtoError::RpcNotFound { service: "Msg".into(), name: "DeletePost".into() }
        );
    }

    #[test]
    fn test_duplicate_rpc_rejected() {
        let mut service = Service::new("Msg");
        service.append_rpc(Rpc::new("CreatePost", "A", "B")).unwrap();
        let err = service.append_rpc(Rpc::new("CreatePost", "C", "D")).unwrap_err();
        assert_eq!(err, ProtoError::DuplicateRpc { service: "Msg".into(), name: "CreatePost".into() });
        assert_eq!(service.rpcs().len(), 1);
    }

    #[test]
    fn test_remove_rpc_at() {
        let mut service = Service::new("Query");
        service.append_rpc(Rpc::new("Post", "QueryGetPostRequest", "QueryGetPostResponse")).unwrap();
        assert_eq!(service.remove_rpc_at(0).unwrap().name, "Post");
        assert_eq!(
            service.remove_rpc_at(0).unwrap_err(),
            ProtoError::IndexOutOfBounds { list: "rpcs", index: 0, len: 0 }
        );
    }

    #[test]
    fn test_proto_puts_options_first() {
        let mut service = Service::new("Query");
        service.append_rpc(Rpc::new("Params", "QueryParamsRequest", "QueryParamsResponse")).unwrap();
        service.append_option(pb::ProtoOption::new("deprecated", pb::Literal::source("false")));
        let rebuilt = service.proto();
        assert!(matches!(rebuilt.elements[0], ServiceElement::Option(_)));
        assert!(matches!(rebuilt.elements[1], ServiceElement::Rpc(_)));
    }
}
