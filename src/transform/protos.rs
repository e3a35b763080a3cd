//! Messages and procedures of the `Msg` and `Query` services.

use super::Options;
use crate::ast::proto::{self as pb, Literal, ProtoOption, Rpc};
use crate::error::RecipeError;
use crate::proto::{Message, ProtoFile};

const PAGINATION: &str = "cosmos/base/query/v1beta1/pagination.proto";
const PAGE_REQUEST: &str = "cosmos.base.query.v1beta1.PageRequest";
const PAGE_RESPONSE: &str = "cosmos.base.query.v1beta1.PageResponse";

/// Create, update and delete actions of a list type, in the order they are scaffolded
pub(super) const ACTIONS: [&str; 3] = ["Create", "Update", "Delete"];

/// `[(gogoproto.nullable) = false]`
pub(super) fn not_nullable() -> ProtoOption {
    ProtoOption::new("(gogoproto.nullable)", Literal::source("false"))
}

/// Add the `Msg` procedures and their request/response messages
pub fn tx_proto(mut file: ProtoFile, opts: &Options) -> Result<ProtoFile, RecipeError> {
    let name = &opts.type_name.upper_camel;
    file.append_import(&format!("{}/{}.proto", opts.module_name, opts.type_name.snake));
    for import in opts.fields.proto_imports(&opts.module_name) {
        file.append_import(&import);
    }

    file.find_service_mut("Msg")?.append_rpcs(ACTIONS.iter().map(|action| {
        let msg = format!("Msg{}{}", action, name);
        Rpc::new(format!("{}{}", action, name), msg.as_str(), format!("{}Response", msg))
    }))?;

    let signer = || pb::Field::new(opts.msg_signer.lower_camel.as_str(), "string");
    let id = || pb::Field::new("id", "uint64");
    let fields = || opts.fields.iter().map(|field| pb::Field::new(field.name.lower_camel.as_str(), field.datatype.proto_type()));

    let mut create = Message::new(format!("MsgCreate{}", name));
    create.append_field(signer())?;
    create.append_fields(fields())?;
    let mut create_response = Message::new(format!("MsgCreate{}Response", name));
    create_response.append_field(id())?;

    let mut update = Message::new(format!("MsgUpdate{}", name));
    update.append_field(signer())?;
    update.append_field(id())?;
    update.append_fields(fields())?;

    let mut delete = Message::new(format!("MsgDelete{}", name));
    delete.append_field(signer())?;
    delete.append_field(id())?;

    for message in [
        create,
        create_response,
        update,
        Message::new(format!("MsgUpdate{}Response", name)),
        delete,
        Message::new(format!("MsgDelete{}Response", name)),
    ] {
        file.append_message(message)?;
    }
    Ok(file)
}

/// Add the get and list queries with their HTTP routes
pub fn query_proto(mut file: ProtoFile, opts: &Options) -> Result<ProtoFile, RecipeError> {
    let name = &opts.type_name.upper_camel;
    let lower = &opts.type_name.lower_camel;
    file.prepend_import("gogoproto/gogo.proto");
    file.append_import(&format!("{}/{}.proto", opts.module_name, opts.type_name.snake));
    file.append_import(PAGINATION);

    let route = format!("/{}/{}/{}/{}", opts.owner_name, opts.app_name, opts.module_name, lower);
    let get = query_rpc(
        name.clone(),
        format!("QueryGet{}", name),
        format!("{}/{{id}}", route),
        &format!("Queries a {} by id.", lower),
    );
    let all = query_rpc(format!("{}All", name), format!("QueryAll{}", name), route, &format!("Queries a list of {} items.", lower));
    file.find_service_mut("Query")?.append_rpcs([get, all])?;

    let mut get_request = Message::new(format!("QueryGet{}Request", name));
    get_request.append_field(pb::Field::new("id", "uint64"))?;
    let mut get_response = Message::new(format!("QueryGet{}Response", name));
    get_response.append_field(pb::Field::new(name.as_str(), name.as_str()).with_option(not_nullable()))?;

    let mut all_request = Message::new(format!("QueryAll{}Request", name));
    all_request.append_field(pb::Field::new("pagination", PAGE_REQUEST))?;
    let mut all_response = Message::new(format!("QueryAll{}Response", name));
    all_response.append_repeated_field(pb::Field::new(name.as_str(), name.as_str()).with_option(not_nullable()))?;
    all_response.append_field(pb::Field::new("pagination", PAGE_RESPONSE))?;

    for message in [get_request, get_response, all_request, all_response] {
        file.append_message(message)?;
    }
    Ok(file)
}

/// `rpc Name(PrefixRequest) returns (PrefixResponse)` routed to `GET path`
fn query_rpc(name: String, prefix: String, path: String, comment: &str) -> Rpc {
    let mut rpc = Rpc::new(name, format!("{}Request", prefix), format!("{}Response", prefix));
    rpc.options.push(ProtoOption::new("(google.api.http).get", Literal::string(path)));
    rpc.decor = rpc.decor.with_comment(comment);
    rpc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtoError;
    use crate::transform::Fields;

    fn opts() -> Options {
        Options::new("blog", "cosmonaut", "blog", "post").unwrap()
    }

    const TX: &str = r#"syntax = "proto3";

package cosmonaut.blog.blog;

option go_package = "github.com/cosmonaut/blog/x/blog/types";

// Msg defines the Msg service.
service Msg {
}
"#;

    #[test]
    fn test_tx_proto_adds_crud_messages() {
        let fields: Fields = "title body:string likes:uint".parse().unwrap();
        let file = ProtoFile::parse(TX, "tx.proto").unwrap();
        let out = tx_proto(file, &opts().with_fields(fields)).unwrap().print();
        let expected = r#"syntax = "proto3";

package cosmonaut.blog.blog;

import "blog/post.proto";

option go_package = "github.com/cosmonaut/blog/x/blog/types";

message MsgCreatePost {
  string creator = 1;
  string title = 2;
  string body = 3;
  uint64 likes = 4;
}

message MsgCreatePostResponse {
  uint64 id = 1;
}

message MsgUpdatePost {
  string creator = 1;
  uint64 id = 2;
  string title = 3;
  string body = 4;
  uint64 likes = 5;
}

message MsgUpdatePostResponse {}

message MsgDeletePost {
  string creator = 1;
  uint64 id = 2;
}

message MsgDeletePostResponse {}

// Msg defines the Msg service.
service Msg {
  rpc CreatePost(MsgCreatePost) returns (MsgCreatePostResponse);
  rpc UpdatePost(MsgUpdatePost) returns (MsgUpdatePostResponse);
  rpc DeletePost(MsgDeletePost) returns (MsgDeletePostResponse);
}
"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_tx_proto_imports_custom_field_types() {
        let fields: Fields = "author:custom:UserProfile,reviewer:UserProfile".parse().unwrap();
        let file = ProtoFile::parse(TX, "tx.proto").unwrap();
        let file = tx_proto(file, &opts().with_fields(fields)).unwrap();
        let imports: Vec<&str> = file.imports.iter().map(|import| import.filename.as_str()).collect();
        assert_eq!(imports, vec!["blog/post.proto", "blog/user_profile.proto"]);
        let create = file.find_message("MsgCreatePost").unwrap();
        assert_eq!(create.find_field("author").unwrap().field.ty, "UserProfile");
    }

    #[test]
    fn test_tx_proto_without_fields() {
        let file = ProtoFile::parse(TX, "tx.proto").unwrap();
        let file = tx_proto(file, &opts()).unwrap();

        let rpcs: Vec<&str> = file.find_service("Msg").unwrap().rpcs().iter().map(|rpc| rpc.name.as_str()).collect();
        assert_eq!(rpcs, vec!["CreatePost", "UpdatePost", "DeletePost"]);
        let messages: Vec<&str> = file.messages.iter().map(|message| message.name.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "MsgCreatePost",
                "MsgCreatePostResponse",
                "MsgUpdatePost",
                "MsgUpdatePostResponse",
                "MsgDeletePost",
                "MsgDeletePostResponse"
            ]
        );

        let out = file.print();
        assert!(out.contains("message MsgCreatePost {\n  string creator = 1;\n}\n"));
        assert!(out.contains("message MsgCreatePostResponse {\n  uint64 id = 1;\n}\n"));
        assert!(out.contains("message MsgUpdatePost {\n  string creator = 1;\n  uint64 id = 2;\n}\n"));
        assert!(out.contains("message MsgDeletePost {\n  string creator = 1;\n  uint64 id = 2;\n}\n"));
        assert!(out.contains("message MsgDeletePostResponse {}\n"));
    }

    #[test]
    fn test_tx_proto_rejects_second_run() {
        let file = ProtoFile::parse(TX, "tx.proto").unwrap();
        let file = tx_proto(file, &opts()).unwrap();
        let err = tx_proto(file, &opts()).unwrap_err();
        assert_eq!(
            err,
            RecipeError::Proto(ProtoError::DuplicateRpc { service: "Msg".into(), name: "CreatePost".into() })
        );
    }

    #[test]
    fn test_query_proto_adds_routes_and_pagination() {
        let source = r#"syntax = "proto3";

package cosmonaut.blog.blog;

import "google/api/annotations.proto";
import "blog/params.proto";

option go_package = "github.com/cosmonaut/blog/x/blog/types";

message QueryParamsRequest {}

// Query defines the gRPC querier service.
service Query {
  rpc Params(QueryParamsRequest) returns (QueryParamsResponse) {
    option (google.api.http).get = "/cosmonaut/blog/blog/params";
  }
}
"#;
        let file = ProtoFile::parse(source, "query.proto").unwrap();
        let out = query_proto(file, &opts()).unwrap().print();
        let expected = r#"syntax = "proto3";

package cosmonaut.blog.blog;

import "gogoproto/gogo.proto";
import "google/api/annotations.proto";
import "blog/params.proto";
import "blog/post.proto";
import "cosmos/base/query/v1beta1/pagination.proto";

option go_package = "github.com/cosmonaut/blog/x/blog/types";

message QueryParamsRequest {}

message QueryGetPostRequest {
  uint64 id = 1;
}

message QueryGetPostResponse {
  Post Post = 1 [(gogoproto.nullable) = false];
}

message QueryAllPostRequest {
  cosmos.base.query.v1beta1.PageRequest pagination = 1;
}

message QueryAllPostResponse {
  repeated Post Post = 1 [(gogoproto.nullable) = false];
  cosmos.base.query.v1beta1.PageResponse pagination = 2;
}

// Query defines the gRPC querier service.
service Query {
  rpc Params(QueryParamsRequest) returns (QueryParamsResponse) {
    option (google.api.http).get = "/cosmonaut/blog/blog/params";
  }
  // Queries a post by id.
  rpc Post(QueryGetPostRequest) returns (QueryGetPostResponse) {
    option (google.api.http).get = "/cosmonaut/blog/blog/post/{id}";
  }
  // Queries a list of post items.
  rpc PostAll(QueryAllPostRequest) returns (QueryAllPostResponse) {
    option (google.api.http).get = "/cosmonaut/blog/blog/post";
  }
}
"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_query_proto_needs_query_service() {
        let file = ProtoFile::parse("syntax = \"proto3\";\n", "query.proto").unwrap();
        let err = query_proto(file, &opts()).unwrap_err();
        assert_eq!(err.to_string(), "could not locate service \"Query\"");
    }
}
