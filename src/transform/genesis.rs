//! Genesis wiring for a list type: proto state, default value, validation,
//! import/export in the keeper and the matching tests.

use super::imports::ensure_import;
use super::protos::not_nullable;
use super::{function_body, insert_before_return_of, method_body, Options};
use crate::ast::go::{BasicLit, CompositeLit, Element, Expr, File, Stmt};
use crate::ast::proto as pb;
use crate::ast::Layout;
use crate::build::{
    errorf, identifier, key_value, make_map_of, Assignment, Builder, FunctionCall, IfStatement, IndexExpression,
    RangeStatement, Slice, Structure, WhenBuilder,
};
use crate::error::RecipeError;
use crate::proto::ProtoFile;
use crate::walk::{apply, composite_literal_mut, key_as_identifier, value_as_basic_literal, value_as_composite_literal_mut};

/// Add `repeated T tList` and `uint64 tCount` to `GenesisState`
pub fn genesis_proto(mut file: ProtoFile, opts: &Options) -> Result<ProtoFile, RecipeError> {
    let name = &opts.type_name;
    file.append_import(&format!("{}/{}.proto", opts.module_name, name.snake));
    file.prepend_import("gogoproto/gogo.proto");

    let state = file.find_message_mut("GenesisState")?;
    state.append_repeated_field(
        pb::Field::new(format!("{}List", name.lower_camel), name.upper_camel.as_str()).with_option(not_nullable()),
    )?;
    state.append_field(pb::Field::new(format!("{}Count", name.lower_camel), "uint64"))?;
    Ok(file)
}

/// `TList: []T{}` in the literal returned by `DefaultGenesis`
pub fn default_genesis(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let name = &opts.type_name.upper_camel;
    let body = function_body(&mut file, "DefaultGenesis")?;
    let state = body
        .stmts
        .iter_mut()
        .rev()
        .find_map(|stmt| match &mut stmt.kind {
            crate::ast::go::StmtKind::Return(results) => results.first_mut().and_then(composite_literal_mut),
            _ => None,
        })
        .ok_or_else(|| RecipeError::anchor("genesis literal returned by \"DefaultGenesis\""))?;

    extend_lines(state, [key_value(&format!("{}List", name), Slice::of(name))]);
    Ok(file)
}

/// Reject duplicated ids and ids past the counter in `GenesisState.Validate`
pub fn validate_genesis(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let body = method_body(&mut file, "GenesisState.Validate")?;
    insert_before_return_of(body, validate_checks(opts), "GenesisState.Validate")?;
    ensure_import(&mut file, None, "fmt");
    Ok(file)
}

fn validate_checks(opts: &Options) -> Vec<Stmt> {
    let lower = &opts.type_name.lower_camel;
    let upper = &opts.type_name.upper_camel;
    let id_map = format!("{}IdMap", lower);
    let count = format!("{}Count", lower);

    let checks = RangeStatement::for_each_item("elem")
        .over(&format!("gs.{}List", upper))
        .body(|block| {
            block.if_stmt(
                WhenBuilder::defining(&["_", "ok"])
                    .to([IndexExpression::named(&id_map).with_identifier("elem.Id")])
                    .if_var("ok")
                    .is_true()
                    .then(|block| {
                        block.returns([errorf(format!("duplicated id for {}", lower))]);
                    }),
            );
            block.if_stmt(IfStatement::var("elem.Id").is_greater_or_equal_to_var(&count).then(|block| {
                block.returns([errorf(format!("{} id should be lower or equal than the last id", lower))]);
            }));
            block.append(Assignment::index(identifier(&id_map), identifier("elem.Id")).to([true]));
        })
        .node();

    vec![
        Assignment::define_variable(&id_map)
            .prepend_comment(&format!("Check for duplicated ID in {}", lower))
            .spaced()
            .to([make_map_of("uint64", "bool")]),
        Assignment::define_variable(&count).to([FunctionCall::new(&format!("gs.Get{}Count", upper))]),
        checks,
    ]
}

/// Load the list and the counter at the top of `InitGenesis`
pub fn init_genesis(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let lower = &opts.type_name.lower_camel;
    let upper = &opts.type_name.upper_camel;
    let stmts = vec![
        RangeStatement::for_each_item("elem")
            .over(&format!("genState.{}List", upper))
            .prepend_comment(&format!("Set all the {}", lower))
            .body(|block| {
                block.call(FunctionCall::new(&format!("k.Set{}", upper)).with_vars(&["ctx", "elem"]));
            })
            .node(),
        FunctionCall::new(&format!("k.Set{}Count", upper))
            .with_argument("ctx")
            .with_argument(&format!("genState.{}Count", upper))
            .prepend_comment(&format!("Set {} count", lower))
            .as_statement(),
    ];

    let body = function_body(&mut file, "InitGenesis")?;
    body.stmts.splice(0..0, stmts);
    Ok(file)
}

/// Copy the list and the counter into the exported state of `ExportGenesis`
pub fn export_genesis(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let upper = &opts.type_name.upper_camel;
    let stmts = vec![
        Assignment::variable(&format!("genesis.{}List", upper))
            .to([FunctionCall::new(&format!("k.GetAll{}", upper)).with_argument("ctx")]),
        Assignment::variable(&format!("genesis.{}Count", upper))
            .to([FunctionCall::new(&format!("k.Get{}Count", upper)).with_argument("ctx")]),
    ];

    let body = function_body(&mut file, "ExportGenesis")?;
    insert_before_return_of(body, stmts, "ExportGenesis")?;
    Ok(file)
}

/// Seed the state of `TestGenesis` and compare it after the round trip
pub fn genesis_test(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let upper = &opts.type_name.upper_camel;
    let list = format!("{}List", upper);
    let count = format!("{}Count", upper);

    let body = function_body(&mut file, "TestGenesis")?;
    let state = body
        .stmts
        .first_mut()
        .and_then(|stmt| match &mut stmt.kind {
            crate::ast::go::StmtKind::Assign(assign) => assign.rhs.first_mut().and_then(composite_literal_mut),
            _ => None,
        })
        .ok_or_else(|| RecipeError::anchor("genesis literal assigned by the first statement of \"TestGenesis\""))?;
    extend_lines(state, [key_value(&list, items(opts, &[0, 1])), key_value(&count, 2)]);

    for (check, field) in [("require.ElementsMatch", &list), ("require.Equal", &count)] {
        let expected = format!("genesisState.{}", field);
        let actual = format!("got.{}", field);
        body.stmts.push(FunctionCall::new(check).with_vars(&["t", expected.as_str(), actual.as_str()]).as_statement());
    }
    Ok(file)
}

/// Extend the table of `TestGenesisState_Validate`: the valid case gets
/// sample items, and a duplicated-id and an invalid-count case are added
pub fn genesis_types_test(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let lower = &opts.type_name.lower_camel;
    let upper = &opts.type_name.upper_camel;
    let list = format!("{}List", upper);
    let count = format!("{}Count", upper);

    let body = function_body(&mut file, "TestGenesisState_Validate")?;

    let mut valid: Option<Result<(), RecipeError>> = None;
    apply(&mut *body, |cursor| {
        if valid.is_some() {
            return false;
        }
        let Some(case) = cursor.composite_lit_mut() else {
            return true;
        };
        if !case.exprs().any(is_valid_state_case) {
            return true;
        }
        let state = case
            .exprs_mut()
            .find(|elt| key_as_identifier(elt) == Some("genState"))
            .and_then(value_as_composite_literal_mut);
        valid = Some(match state {
            Some(state) => {
                extend_lines(state, [key_value(&list, items(opts, &[0, 1])), key_value(&count, 2)]);
                Ok(())
            }
            None => Err(RecipeError::anchor("genState of the \"valid genesis state\" case")),
        });
        false
    });
    valid.unwrap_or_else(|| Err(RecipeError::anchor("test case with desc \"valid genesis state\"")))?;

    let duplicated = Structure::anonymous()
        .append_field("desc", format!("duplicated {}", lower))
        .append_expr("genState", Structure::named("types.GenesisState").append_expr(&list, items(opts, &[0, 0]).build()).address_of())
        .append_field("valid", false);
    let invalid_count = Structure::anonymous()
        .append_field("desc", format!("invalid {} count", lower))
        .append_expr(
            "genState",
            Structure::named("types.GenesisState")
                .append_expr(&list, items(opts, &[1]).build())
                .append_field(&count, 0)
                .address_of(),
        )
        .append_field("valid", false);

    let mut cases = Some(vec![duplicated.done(), invalid_count.done()]);
    apply(&mut *body, |cursor| {
        if cases.is_none() {
            return false;
        }
        match cursor.composite_lit_mut() {
            Some(table) if is_struct_slice(table) => {
                table.elts.extend(cases.take().into_iter().flatten().map(Element::from));
                false
            }
            _ => true,
        }
    });
    if cases.is_some() {
        return Err(RecipeError::anchor("test case table in \"TestGenesisState_Validate\""));
    }
    Ok(file)
}

/// `[]types.T{{Id: a}, {Id: b}}`, one element per line
fn items(opts: &Options, ids: &[u32]) -> Slice {
    ids.iter().fold(
        Slice::of(&format!("types.{}", opts.type_name.upper_camel)).layout(Layout::Lines),
        |slice, &id| slice.append(Structure::anonymous().append_field("Id", id)),
    )
}

fn is_valid_state_case(elt: &Expr) -> bool {
    key_as_identifier(elt) == Some("desc")
        && value_as_basic_literal(elt).and_then(BasicLit::unquoted).as_deref() == Some("valid genesis state")
}

/// `[]struct{...}{...}`
fn is_struct_slice(lit: &CompositeLit) -> bool {
    matches!(
        lit.ty.as_deref(),
        Some(Expr::ArrayType { len: None, elt }) if matches!(elt.as_ref(), Expr::StructType(_))
    )
}

/// Append to a literal and spread it over several lines
pub(super) fn extend_lines(lit: &mut CompositeLit, elts: impl IntoIterator<Item = Expr>) {
    lit.elts.extend(elts.into_iter().map(Element::from));
    lit.layout = Layout::Lines;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Tree;
    use std::path::Path;

    fn opts() -> Options {
        Options::new("blog", "cosmonaut", "blog", "post").unwrap()
    }

    fn go(source: &str) -> File {
        File::parse(source, Path::new("genesis.go")).unwrap()
    }

    #[test]
    fn test_genesis_proto_numbers_after_existing_fields() {
        let source = "syntax = \"proto3\";\n\npackage cosmonaut.blog.blog;\n\nimport \"blog/params.proto\";\n\nmessage GenesisState {\n  Params params = 1;\n  repeated Comment commentList = 2;\n  uint64 commentCount = 3;\n}\n";
        let file = ProtoFile::parse(source, "genesis.proto").unwrap();
        let out = genesis_proto(file, &opts()).unwrap().print();
        assert_eq!(
            out,
            "syntax = \"proto3\";\n\npackage cosmonaut.blog.blog;\n\nimport \"gogoproto/gogo.proto\";\nimport \"blog/params.proto\";\nimport \"blog/post.proto\";\n\nmessage GenesisState {\n  Params params = 1;\n  repeated Comment commentList = 2;\n  uint64 commentCount = 3;\n  repeated Post postList = 4 [(gogoproto.nullable) = false];\n  uint64 postCount = 5;\n}\n"
        );
    }

    #[test]
    fn test_genesis_proto_needs_state_message() {
        let file = ProtoFile::parse("syntax = \"proto3\";\n", "genesis.proto").unwrap();
        let err = genesis_proto(file, &opts()).unwrap_err();
        assert_eq!(err.to_string(), "could not locate message \"GenesisState\"");
    }

    #[test]
    fn test_default_genesis_appends_empty_list() {
        let file = go("package types\n\nfunc DefaultGenesis() *GenesisState {\n\treturn &GenesisState{\n\t\tParams: DefaultParams(),\n\t}\n}\n");
        let out = default_genesis(file, &opts()).unwrap().print();
        assert_eq!(
            out,
            "package types\n\nfunc DefaultGenesis() *GenesisState {\n\treturn &GenesisState{\n\t\tParams: DefaultParams(),\n\t\tPostList: []Post{},\n\t}\n}\n"
        );
    }

    #[test]
    fn test_default_genesis_without_literal_fails() {
        let file = go("package types\n\nfunc DefaultGenesis() *GenesisState {\n\treturn nil\n}\n");
        assert!(matches!(default_genesis(file, &opts()), Err(RecipeError::AnchorNotFound(_))));
    }

    #[test]
    fn test_validate_inserts_checks_and_fmt() {
        let file = go("package types\n\nfunc (gs GenesisState) Validate() error {\n\treturn gs.Params.Validate()\n}\n");
        let out = validate_genesis(file, &opts()).unwrap().print();
        assert_eq!(
            out,
            "package types\n\nimport (\n\t\"fmt\"\n)\n\nfunc (gs GenesisState) Validate() error {\n\t// Check for duplicated ID in post\n\tpostIdMap := make(map[uint64]bool)\n\tpostCount := gs.GetPostCount()\n\tfor _, elem := range gs.PostList {\n\t\tif _, ok := postIdMap[elem.Id]; ok {\n\t\t\treturn fmt.Errorf(\"duplicated id for post\")\n\t\t}\n\t\tif elem.Id >= postCount {\n\t\t\treturn fmt.Errorf(\"post id should be lower or equal than the last id\")\n\t\t}\n\t\tpostIdMap[elem.Id] = true\n\t}\n\treturn gs.Params.Validate()\n}\n"
        );
    }

    #[test]
    fn test_init_and_export() {
        let file = go("package blog\n\nfunc InitGenesis(ctx sdk.Context, k keeper.Keeper, genState types.GenesisState) {\n\tk.SetParams(ctx, genState.Params)\n}\n\nfunc ExportGenesis(ctx sdk.Context, k keeper.Keeper) *types.GenesisState {\n\tgenesis := types.DefaultGenesis()\n\tgenesis.Params = k.GetParams(ctx)\n\treturn genesis\n}\n");
        let file = init_genesis(file, &opts()).unwrap();
        let out = export_genesis(file, &opts()).unwrap().print();
        assert_eq!(
            out,
            "package blog\n\nfunc InitGenesis(ctx sdk.Context, k keeper.Keeper, genState types.GenesisState) {\n\t// Set all the post\n\tfor _, elem := range genState.PostList {\n\t\tk.SetPost(ctx, elem)\n\t}\n\t// Set post count\n\tk.SetPostCount(ctx, genState.PostCount)\n\tk.SetParams(ctx, genState.Params)\n}\n\nfunc ExportGenesis(ctx sdk.Context, k keeper.Keeper) *types.GenesisState {\n\tgenesis := types.DefaultGenesis()\n\tgenesis.Params = k.GetParams(ctx)\n\tgenesis.PostList = k.GetAllPost(ctx)\n\tgenesis.PostCount = k.GetPostCount(ctx)\n\treturn genesis\n}\n"
        );
    }

    #[test]
    fn test_genesis_test_seeds_and_compares() {
        let file = go("package blog_test\n\nfunc TestGenesis(t *testing.T) {\n\tgenesisState := types.GenesisState{\n\t\tParams: types.DefaultParams(),\n\t}\n\n\tk, ctx := keepertest.BlogKeeper(t)\n\tblog.InitGenesis(ctx, *k, genesisState)\n\tgot := blog.ExportGenesis(ctx, *k)\n\trequire.NotNil(t, got)\n}\n");
        let out = genesis_test(file, &opts()).unwrap().print();
        assert_eq!(
            out,
            "package blog_test\n\nfunc TestGenesis(t *testing.T) {\n\tgenesisState := types.GenesisState{\n\t\tParams: types.DefaultParams(),\n\t\tPostList: []types.Post{\n\t\t\t{\n\t\t\t\tId: 0,\n\t\t\t},\n\t\t\t{\n\t\t\t\tId: 1,\n\t\t\t},\n\t\t},\n\t\tPostCount: 2,\n\t}\n\n\tk, ctx := keepertest.BlogKeeper(t)\n\tblog.InitGenesis(ctx, *k, genesisState)\n\tgot := blog.ExportGenesis(ctx, *k)\n\trequire.NotNil(t, got)\n\trequire.ElementsMatch(t, genesisState.PostList, got.PostList)\n\trequire.Equal(t, genesisState.PostCount, got.PostCount)\n}\n"
        );
    }

    #[test]
    fn test_genesis_types_test_extends_table() {
        let file = go("package types_test\n\nfunc TestGenesisState_Validate(t *testing.T) {\n\tfor _, tc := range []struct {\n\t\tdesc string\n\t\tgenState *types.GenesisState\n\t\tvalid bool\n\t}{\n\t\t{\n\t\t\tdesc: \"valid genesis state\",\n\t\t\tgenState: &types.GenesisState{},\n\t\t\tvalid: true,\n\t\t},\n\t} {\n\t\tt.Run(tc.desc, func(t *testing.T) {\n\t\t\trequire.Equal(t, tc.valid, tc.genState.Validate() == nil)\n\t\t})\n\t}\n}\n");
        let out = genesis_types_test(file, &opts()).unwrap().print();
        let expected = "package types_test

func TestGenesisState_Validate(t *testing.T) {
	for _, tc := range []struct {
		desc string
		genState *types.GenesisState
		valid bool
	}{
		{
			desc: \"valid genesis state\",
			genState: &types.GenesisState{
				PostList: []types.Post{
					{
						Id: 0,
					},
					{
						Id: 1,
					},
				},
				PostCount: 2,
			},
			valid: true,
		},
		{
			desc: \"duplicated post\",
			genState: &types.GenesisState{
				PostList: []types.Post{
					{
						Id: 0,
					},
					{
						Id: 0,
					},
				},
			},
			valid: false,
		},
		{
			desc: \"invalid post count\",
			genState: &types.GenesisState{
				PostList: []types.Post{
					{
						Id: 1,
					},
				},
				PostCount: 0,
			},
			valid: false,
		},
	} {
		t.Run(tc.desc, func(t *testing.T) {
			require.Equal(t, tc.valid, tc.genState.Validate() == nil)
		})
	}
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_genesis_types_test_requires_valid_case() {
        let file = go("package types_test\n\nfunc TestGenesisState_Validate(t *testing.T) {\n\tfor _, tc := range []struct {\n\t\tdesc string\n\t}{\n\t\t{\n\t\t\tdesc: \"default is valid\",\n\t\t},\n\t} {\n\t\t_ = tc\n\t}\n}\n");
        let err = genesis_types_test(file, &opts()).unwrap_err();
        assert_eq!(err, RecipeError::anchor("test case with desc \"valid genesis state\""));
    }
}
