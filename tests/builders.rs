use scaffold_mutate::ast::go::{BinaryOp, Expr, File};
use scaffold_mutate::build::{
    address_of, identifier, int, Assignment, Builder, FunctionCall, IfStatement, RangeStatement, Slice,
    Structure,
};
use scaffold_mutate::generate::print_stmt;
use scaffold_mutate::walk::{apply, find_method_mut, insert_before_return, key_as_identifier, value_as_basic_literal};
use scaffold_mutate::Tree;
use std::path::Path;

fn parse(source: &str) -> File {
    File::parse(source, Path::new("post.go")).unwrap()
}

#[test]
fn test_keeper_method_from_builders() {
    let mut file = parse(
        "package keeper\n\nfunc (k Keeper) AppendPost(ctx sdk.Context, post types.Post) uint64 {\n\treturn count\n}\n",
    );
    let store = FunctionCall::new("prefix.NewStore")
        .with_parameter(FunctionCall::new("ctx.KVStore").with_argument("k.storeKey"))
        .with_parameter(FunctionCall::new("types.KeyPrefix").with_argument("types.PostKey"));
    let stmts = vec![
        Assignment::define_variable("count").to([FunctionCall::new("k.GetPostCount").with_argument("ctx")]),
        Assignment::variable("post.Id").to([identifier("count")]),
        Assignment::define_variable("store").to([store]),
        Assignment::define_variable("appendedValue")
            .to([FunctionCall::new("k.cdc.MustMarshal").with_parameter(address_of(identifier("post")))]),
        FunctionCall::new("store.Set")
            .with_parameter(FunctionCall::new("GetPostIDBytes").with_argument("post.Id"))
            .with_argument("appendedValue")
            .as_statement(),
        FunctionCall::new("k.SetPostCount")
            .with_argument("ctx")
            .with_parameter(Expr::binary(identifier("count"), BinaryOp::Add, int(1)))
            .prepend_comment("Update post count")
            .spaced()
            .as_statement(),
    ];

    let method = find_method_mut(&mut file, "Keeper.AppendPost").unwrap();
    let body = method.body.as_mut().unwrap();
    assert!(insert_before_return(body, stmts));

    assert_eq!(
        file.print(),
        "package keeper

func (k Keeper) AppendPost(ctx sdk.Context, post types.Post) uint64 {
	count := k.GetPostCount(ctx)
	post.Id = count
	store := prefix.NewStore(ctx.KVStore(k.storeKey), types.KeyPrefix(types.PostKey))
	appendedValue := k.cdc.MustMarshal(&post)
	store.Set(GetPostIDBytes(post.Id), appendedValue)

	// Update post count
	k.SetPostCount(ctx, count + 1)
	return count
}
"
    );
}

#[test]
fn test_pointer_receivers_match_by_type_name() {
    let mut file = parse("package keeper\n\nfunc (k *Keeper) SetPost(ctx sdk.Context, post types.Post) {\n}\n");
    assert!(find_method_mut(&mut file, "Keeper.SetPost").is_ok());
    let err = find_method_mut(&mut file, "Keeper.GetPost").unwrap_err();
    assert_eq!(err.to_string(), "could not locate method \"GetPost\" with receiver \"Keeper\"");
}

#[test]
fn test_walk_rewrites_a_literal_field() {
    let mut file = parse(
        "package types\n\nfunc DefaultParams() Params {\n\treturn Params{\n\t\tMaxLen: 10,\n\t\tName: \"x\",\n\t}\n}\n",
    );
    let mut old = None;
    apply(&mut file, |cursor| {
        let Some(lit) = cursor.composite_lit_mut() else {
            return true;
        };
        for elt in lit.exprs_mut() {
            if key_as_identifier(elt) != Some("MaxLen") {
                continue;
            }
            old = value_as_basic_literal(elt).map(|value| value.value.clone());
            if let Expr::KeyValue { value, .. } = elt {
                **value = int(20);
            }
        }
        false
    });
    assert_eq!(old.as_deref(), Some("10"));
    assert!(file.print().contains("\t\tMaxLen: 20,\n\t\tName: \"x\",\n"));
}

#[test]
fn test_loop_with_guard() {
    let stmt = RangeStatement::for_each_item("elem")
        .over("msg.Items")
        .body(|block| {
            block.if_stmt(IfStatement::var("elem.Hidden").is_true().then(|then| {
                then.continue_stmt();
            }));
            block.append(
                Assignment::variable("out")
                    .to([FunctionCall::new("append").with_argument("out").with_argument("elem").build()]),
            );
        })
        .node();
    assert_eq!(
        print_stmt(&stmt),
        "for _, elem := range msg.Items {\n\tif (elem.Hidden) == true {\n\t\tcontinue\n\t}\n\tout = append(out, elem)\n}"
    );
}

#[test]
fn test_nested_literals() {
    let stmt = Assignment::define_variable("genesisState").to([Structure::named("types.GenesisState")
        .append_field("Params", FunctionCall::new("types.DefaultParams"))
        .append_field("PostList", Slice::of("types.Post").extend([Structure::anonymous().append_field("Id", 0)]))]);
    assert_eq!(
        print_stmt(&stmt),
        "genesisState := types.GenesisState{\n\tParams: types.DefaultParams(),\n\tPostList: []types.Post{{\n\t\tId: 0,\n\t}},\n}"
    );
}
