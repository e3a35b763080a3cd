//! Module plumbing: gateway routes, store keys and codec registration.

use super::imports::ensure_import;
use super::protos::ACTIONS;
use super::{function_body, method_body, Options};
use crate::ast::go::{Decl, DeclKeyword, Expr, File, GenDecl, Stmt, StmtKind};
use crate::build::{global, identifier, nil, FunctionCall, Structure};
use crate::error::RecipeError;
use tracing::warn;

/// Serve the query routes from `RegisterGRPCGatewayRoutes`, once.
///
/// A body that already has statements is left as it is.
pub fn grpc_gateway_routes(mut file: File, _opts: &Options) -> Result<File, RecipeError> {
    let body = method_body(&mut file, "AppModuleBasic.RegisterGRPCGatewayRoutes")?;
    if !body.stmts.is_empty() {
        warn!("RegisterGRPCGatewayRoutes already registers routes, leaving it alone");
        return Ok(file);
    }
    let client = FunctionCall::new("types.NewQueryClient").with_argument("clientCtx");
    body.stmts.push(
        FunctionCall::new("types.RegisterQueryHandlerClient")
            .with_parameter(FunctionCall::new("context.Background"))
            .with_argument("mux")
            .with_parameter(client)
            .as_statement(),
    );
    ensure_import(&mut file, None, "context");
    Ok(file)
}

/// Prefixes of the store entries and of the counter
pub fn store_keys(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let name = &opts.type_name.upper_camel;
    let specs = vec![
        global(&format!("{}Key", name), format!("{}-value-", name)),
        global(&format!("{}CountKey", name), format!("{}-count-", name)),
    ];
    file.decls.push(Decl::Gen(GenDecl::new(DeclKeyword::Const, specs)));
    Ok(file)
}

/// Register the messages with the amino codec
pub fn codec_register(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let body = function_body(&mut file, "RegisterCodec")?;
    for action in ACTIONS {
        let msg = format!("Msg{}{}", action, opts.type_name.upper_camel);
        body.stmts.push(
            FunctionCall::new("cdc.RegisterConcrete")
                .with_parameter(Structure::named(&msg).address_of())
                .with_string(&format!("{}/{}{}", opts.module_name, action, opts.type_name.upper_camel))
                .with_parameter(nil())
                .as_statement(),
        );
    }
    Ok(file)
}

/// Register the messages as `sdk.Msg` implementations, ahead of the service
/// descriptor when there is one
pub fn codec_interfaces(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let msg_interface = Expr::paren(Expr::Star(Box::new(identifier("sdk.Msg"))));
    let register = ACTIONS
        .iter()
        .map(|action| Structure::named(&format!("Msg{}{}", action, opts.type_name.upper_camel)).address_of())
        .fold(
            FunctionCall::new("registry.RegisterImplementations")
                .with_parameter(FunctionCall::of(msg_interface).with_parameters([nil()])),
            |call, msg| call.with_parameter(msg),
        )
        .as_statement();

    let body = function_body(&mut file, "RegisterInterfaces")?;
    match body.stmts.iter().position(is_service_registration) {
        Some(idx) => body.stmts.insert(idx, register),
        None => body.stmts.push(register),
    }
    ensure_import(&mut file, Some("sdk"), "github.com/cosmos/cosmos-sdk/types");
    Ok(file)
}

/// `msgservice.RegisterMsgServiceDesc(...)`
fn is_service_registration(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Expr(Expr::Call(call)) => call.fun.dotted_name().as_deref() == Some("msgservice.RegisterMsgServiceDesc"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Tree;
    use std::path::Path;

    fn opts() -> Options {
        Options::new("blog", "cosmonaut", "blog", "post").unwrap()
    }

    fn parse(source: &str) -> File {
        File::parse(source, Path::new("module.go")).unwrap()
    }

    #[test]
    fn test_gateway_routes_fill_empty_body() {
        let source = "package blog

import (
	\"github.com/cosmos/cosmos-sdk/client\"
)

// RegisterGRPCGatewayRoutes registers the gRPC Gateway routes for the module
func (AppModuleBasic) RegisterGRPCGatewayRoutes(clientCtx client.Context, mux *runtime.ServeMux) {
	// this line is used by starport scaffolding # 2
}
";
        let out = grpc_gateway_routes(parse(source), &opts()).unwrap().print();
        let expected = "package blog

import (
	\"github.com/cosmos/cosmos-sdk/client\"
	\"context\"
)

// RegisterGRPCGatewayRoutes registers the gRPC Gateway routes for the module
func (AppModuleBasic) RegisterGRPCGatewayRoutes(clientCtx client.Context, mux *runtime.ServeMux) {
	types.RegisterQueryHandlerClient(context.Background(), mux, types.NewQueryClient(clientCtx))
	// this line is used by starport scaffolding # 2
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_gateway_routes_run_once() {
        let source = "package blog\n\nfunc (AppModuleBasic) RegisterGRPCGatewayRoutes(clientCtx client.Context, mux *runtime.ServeMux) {\n\tregister(mux)\n}\n";
        let out = grpc_gateway_routes(parse(source), &opts()).unwrap().print();
        assert_eq!(out, source);
    }

    #[test]
    fn test_store_keys() {
        let source = "package types\n\nconst (\n\tModuleName = \"blog\"\n\tStoreKey = ModuleName\n)\n";
        let out = store_keys(parse(source), &opts()).unwrap().print();
        assert_eq!(
            out,
            "package types\n\nconst (\n\tModuleName = \"blog\"\n\tStoreKey = ModuleName\n)\n\nconst (\n\tPostKey = \"Post-value-\"\n\tPostCountKey = \"Post-count-\"\n)\n"
        );
    }

    #[test]
    fn test_codec_registration() {
        let source = "package types

import (
	\"github.com/cosmos/cosmos-sdk/codec\"
	cdctypes \"github.com/cosmos/cosmos-sdk/codec/types\"
	\"github.com/cosmos/cosmos-sdk/types/msgservice\"
)

func RegisterCodec(cdc *codec.LegacyAmino) {
}

func RegisterInterfaces(registry cdctypes.InterfaceRegistry) {
	msgservice.RegisterMsgServiceDesc(registry, &_Msg_serviceDesc)
}
";
        let file = codec_register(parse(source), &opts()).unwrap();
        let out = codec_interfaces(file, &opts()).unwrap().print();
        let expected = "package types

import (
	\"github.com/cosmos/cosmos-sdk/codec\"
	cdctypes \"github.com/cosmos/cosmos-sdk/codec/types\"
	\"github.com/cosmos/cosmos-sdk/types/msgservice\"
	sdk \"github.com/cosmos/cosmos-sdk/types\"
)

func RegisterCodec(cdc *codec.LegacyAmino) {
	cdc.RegisterConcrete(&MsgCreatePost{}, \"blog/CreatePost\", nil)
	cdc.RegisterConcrete(&MsgUpdatePost{}, \"blog/UpdatePost\", nil)
	cdc.RegisterConcrete(&MsgDeletePost{}, \"blog/DeletePost\", nil)
}

func RegisterInterfaces(registry cdctypes.InterfaceRegistry) {
	registry.RegisterImplementations((*sdk.Msg)(nil), &MsgCreatePost{}, &MsgUpdatePost{}, &MsgDeletePost{})
	msgservice.RegisterMsgServiceDesc(registry, &_Msg_serviceDesc)
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_codec_interfaces_append_without_descriptor() {
        let source = "package types\n\nimport (\n\tsdk \"github.com/cosmos/cosmos-sdk/types\"\n)\n\nfunc RegisterInterfaces(registry cdctypes.InterfaceRegistry) {\n\tsetup(registry)\n}\n";
        let out = codec_interfaces(parse(source), &opts()).unwrap().print();
        assert!(out.ends_with("\tsetup(registry)\n\tregistry.RegisterImplementations((*sdk.Msg)(nil), &MsgCreatePost{}, &MsgUpdatePost{}, &MsgDeletePost{})\n}\n"));
        assert_eq!(out.matches("cosmos-sdk/types\"").count(), 1);
    }
}
