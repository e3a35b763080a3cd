use super::protos::ACTIONS;
use super::{function_body, insert_before_return_of, Options};
use crate::ast::go::{File, Stmt};
use crate::build::FunctionCall;
use crate::error::RecipeError;

/// Register the create, update and delete commands in `GetTxCmd`
pub fn tx_commands(file: File, opts: &Options) -> Result<File, RecipeError> {
    add_commands(file, "GetTxCmd", &ACTIONS, opts)
}

/// Register the list and show commands in `GetQueryCmd`
pub fn query_commands(file: File, opts: &Options) -> Result<File, RecipeError> {
    add_commands(file, "GetQueryCmd", &["List", "Show"], opts)
}

fn add_commands(mut file: File, function: &str, actions: &[&str], opts: &Options) -> Result<File, RecipeError> {
    let stmts: Vec<Stmt> = actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let command = FunctionCall::new(&format!("Cmd{}{}", action, opts.type_name.upper_camel));
            let call = FunctionCall::new("cmd.AddCommand").with_parameter(command);
            if i == 0 { call.spaced() } else { call }.as_statement()
        })
        .collect();

    let body = function_body(&mut file, function)?;
    insert_before_return_of(body, stmts, function)?;
    Ok(file)
}
