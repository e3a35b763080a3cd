//! Simulation support in `module_simulation.go`.

use super::genesis::extend_lines;
use super::protos::ACTIONS;
use super::{insert_before_return_of, method_body, Options};
use crate::ast::go::{Decl, DeclKeyword, Expr, File, GenDecl, Stmt};
use crate::ast::{Layout, Spacing};
use crate::build::{
    address_of, global, identifier, key_value, nil, typed_global, uninitialized_var, Assignment, Builder, Function,
    FunctionCall, Slice, Structure,
};
use crate::error::RecipeError;
use crate::walk::apply;
use tracing::debug;

/// Two sample items and the counter in the state built by `GenerateGenesisState`
pub fn simulation_genesis(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let name = &opts.type_name.upper_camel;
    let signer = &opts.msg_signer.upper_camel;
    let sample = |id: u32| {
        Structure::anonymous().append_field("Id", id).append_field(signer, FunctionCall::new("sample.AccAddress"))
    };
    let mut elts = Some(vec![
        key_value(
            &format!("{}List", name),
            Slice::of(&format!("types.{}", name)).layout(Layout::Lines).append(sample(0)).append(sample(1)),
        ),
        key_value(&format!("{}Count", name), 2),
    ]);

    let body = method_body(&mut file, "AppModule.GenerateGenesisState")?;
    apply(&mut *body, |cursor| {
        if elts.is_none() {
            return false;
        }
        match cursor.composite_lit_mut() {
            Some(lit) if is_genesis_state(lit.ty.as_deref()) => {
                extend_lines(lit, elts.take().into_iter().flatten());
                false
            }
            _ => true,
        }
    });
    if elts.is_some() {
        return Err(RecipeError::anchor("GenesisState literal in \"GenerateGenesisState\""));
    }
    Ok(file)
}

/// `pkg.GenesisState`
fn is_genesis_state(ty: Option<&Expr>) -> bool {
    matches!(ty, Some(Expr::Selector { sel, .. }) if sel == "GenesisState")
}

/// Operation names and default weights for each message.
///
/// They go into the first `const` group, which is created in front of the
/// first function when the file has none.
pub fn simulation_weights(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let specs = ACTIONS.iter().flat_map(|action| {
        let target = format!("{}{}", action, opts.type_name.upper_camel);
        let mut op = global(&format!("opWeightMsg{}", target), format!("op_weight_msg_{}_{}", action.to_lowercase(), opts.type_name.snake));
        op.decor_mut().before = Spacing::EmptyLine;
        let mut weight = typed_global(&format!("defaultWeightMsg{}", target), "int", 100);
        *weight.decor_mut() = weight.decor().clone().with_comment("TODO: Determine the simulation weight value");
        [op, weight]
    });

    let existing = file.decls.iter_mut().find_map(|decl| match decl {
        Decl::Gen(gen_decl) if gen_decl.keyword == DeclKeyword::Const => Some(gen_decl),
        _ => None,
    });
    match existing {
        Some(consts) => {
            consts.specs.extend(specs);
            consts.grouped = true;
        }
        None => {
            debug!("no const group, creating one");
            let idx = file.decls.iter().position(|decl| matches!(decl, Decl::Func(_))).unwrap_or(file.decls.len());
            let mut consts = GenDecl::new(DeclKeyword::Const, specs.collect());
            consts.grouped = true;
            file.decls.insert(idx, Decl::Gen(consts));
        }
    }
    Ok(file)
}

/// Weighted operations for each message, ahead of the return of `WeightedOperations`
pub fn simulation_operations(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let stmts: Vec<Stmt> = ACTIONS.iter().flat_map(|action| weighted_operation(action, opts)).collect();
    let body = method_body(&mut file, "AppModule.WeightedOperations")?;
    insert_before_return_of(body, stmts, "WeightedOperations")?;
    Ok(file)
}

fn weighted_operation(action: &str, opts: &Options) -> [Stmt; 3] {
    let name = format!("{}{}", action, opts.type_name.upper_camel);
    let weight = format!("weightMsg{}", name);

    let fallback = Function::new()
        .parameter("_", Expr::Star(Box::new(identifier("rand.Rand"))))
        .body(|block| {
            block.append(Assignment::variable(&weight).to([identifier(&format!("defaultWeightMsg{}", name))]));
        });
    let get_or_generate = FunctionCall::new("simState.AppParams.GetOrGenerate")
        .with_argument("simState.Cdc")
        .with_argument(&format!("opWeightMsg{}", name))
        .with_parameter(address_of(identifier(&weight)))
        .with_parameter(nil())
        .with_parameter(fallback);

    let simulate = FunctionCall::new(&format!("{}simulation.SimulateMsg{}", opts.module_name, name))
        .with_vars(&["am.accountKeeper", "am.bankKeeper", "am.keeper"]);
    let operation = FunctionCall::new("simulation.NewWeightOperation").with_argument(&weight).with_parameter(simulate);
    let append = FunctionCall::new("append").with_argument("operations").with_parameter(operation);

    let mut declare = uninitialized_var(&weight, "int");
    declare.decor.before = Spacing::EmptyLine;
    [declare, get_or_generate.as_statement(), Assignment::variable("operations").to([append.build()])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Tree;
    use std::path::Path;

    fn opts() -> Options {
        Options::new("blog", "cosmonaut", "blog", "post").unwrap()
    }

    const SIMULATION: &str = "package blog

import (
	\"math/rand\"

	\"github.com/cosmonaut/blog/testutil/sample\"
	blogsimulation \"github.com/cosmonaut/blog/x/blog/simulation\"
	\"github.com/cosmonaut/blog/x/blog/types\"
	\"github.com/cosmos/cosmos-sdk/types/module\"
	simtypes \"github.com/cosmos/cosmos-sdk/types/simulation\"
	\"github.com/cosmos/cosmos-sdk/x/simulation\"
)

// avoid unused import issue
var (
	_ = sample.AccAddress
	_ = blogsimulation.FindAccount
	_ = simulation.MsgEntryKind
)

// GenerateGenesisState creates a randomized GenState of the module
func (AppModule) GenerateGenesisState(simState *module.SimulationState) {
	accs := make([]string, len(simState.Accounts))
	for i, acc := range simState.Accounts {
		accs[i] = acc.Address.String()
	}
	blogGenesis := types.GenesisState{
		Params: types.DefaultParams(),
		// this line is used by starport scaffolding # simapp/module/genesisState
	}
	simState.GenState[types.ModuleName] = simState.Cdc.MustMarshalJSON(&blogGenesis)
}

// WeightedOperations returns the all the gov module operations with their respective weights.
func (am AppModule) WeightedOperations(simState module.SimulationState) []simtypes.WeightedOperation {
	operations := make([]simtypes.WeightedOperation, 0)

	return operations
}
";

    #[test]
    fn test_simulation_genesis_adds_samples() {
        let file = File::parse(SIMULATION, Path::new("module_simulation.go")).unwrap();
        let out = simulation_genesis(file, &opts()).unwrap().print();
        assert!(out.contains(
            "\tblogGenesis := types.GenesisState{
		Params: types.DefaultParams(),
		PostList: []types.Post{
			{
				Id: 0,
				Creator: sample.AccAddress(),
			},
			{
				Id: 1,
				Creator: sample.AccAddress(),
			},
		},
		PostCount: 2,
		// this line is used by starport scaffolding # simapp/module/genesisState
	}
"
        ));
    }

    #[test]
    fn test_simulation_genesis_needs_state_literal() {
        let source = "package blog\n\nfunc (AppModule) GenerateGenesisState(simState *module.SimulationState) {\n\tsetup(simState)\n}\n";
        let file = File::parse(source, Path::new("module_simulation.go")).unwrap();
        assert!(matches!(simulation_genesis(file, &opts()), Err(RecipeError::AnchorNotFound(_))));
    }

    #[test]
    fn test_simulation_weights_create_const_group() {
        let file = File::parse(SIMULATION, Path::new("module_simulation.go")).unwrap();
        let out = simulation_weights(file, &opts()).unwrap().print();
        assert!(out.contains(
            "\t_ = simulation.MsgEntryKind
)

const (
	opWeightMsgCreatePost = \"op_weight_msg_create_post\"
	// TODO: Determine the simulation weight value
	defaultWeightMsgCreatePost int = 100

	opWeightMsgUpdatePost = \"op_weight_msg_update_post\"
	// TODO: Determine the simulation weight value
	defaultWeightMsgUpdatePost int = 100

	opWeightMsgDeletePost = \"op_weight_msg_delete_post\"
	// TODO: Determine the simulation weight value
	defaultWeightMsgDeletePost int = 100
)

// GenerateGenesisState"
        ));
    }

    #[test]
    fn test_simulation_weights_extend_existing_group() {
        let source = "package blog\n\nconst (\n\topWeightMsgCreateComment = \"op_weight_msg_create_comment\"\n)\n";
        let file = File::parse(source, Path::new("module_simulation.go")).unwrap();
        let out = simulation_weights(file, &opts()).unwrap().print();
        assert!(out.starts_with(
            "package blog\n\nconst (\n\topWeightMsgCreateComment = \"op_weight_msg_create_comment\"\n\n\topWeightMsgCreatePost = \"op_weight_msg_create_post\"\n"
        ));
        assert_eq!(out.matches("int = 100").count(), 3);
    }

    #[test]
    fn test_simulation_operations() {
        let file = File::parse(SIMULATION, Path::new("module_simulation.go")).unwrap();
        let out = simulation_operations(file, &opts()).unwrap().print();
        let create = "\toperations := make([]simtypes.WeightedOperation, 0)

	var weightMsgCreatePost int
	simState.AppParams.GetOrGenerate(simState.Cdc, opWeightMsgCreatePost, &weightMsgCreatePost, nil, func(_ *rand.Rand) {
		weightMsgCreatePost = defaultWeightMsgCreatePost
	})
	operations = append(operations, simulation.NewWeightOperation(weightMsgCreatePost, blogsimulation.SimulateMsgCreatePost(am.accountKeeper, am.bankKeeper, am.keeper)))

	var weightMsgUpdatePost int
";
        assert!(out.contains(create), "{}", out);
        assert!(out.ends_with("am.bankKeeper, am.keeper)))\n\n\treturn operations\n}\n"));
    }
}
