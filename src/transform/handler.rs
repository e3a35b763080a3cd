use super::protos::ACTIONS;
use super::{function_body, Options};
use crate::ast::go::{CaseClause, Expr, File, Stmt, StmtKind};
use crate::ast::{Decor, Spacing};
use crate::build::{identifier, Assignment, Builder, FunctionCall};
use crate::error::RecipeError;
use crate::walk::apply;
use tracing::debug;

/// Route the create, update and delete messages in `NewHandler`.
///
/// The message server is created in front of the switch unless the handler
/// already defines one.
pub fn new_handler(mut file: File, opts: &Options) -> Result<File, RecipeError> {
    let body = function_body(&mut file, "NewHandler")?;

    let mut has_server = false;
    apply(&mut *body, |cursor| {
        if let Some(Stmt { kind: StmtKind::Assign(assign), .. }) = cursor.stmt() {
            has_server |= assign.lhs.iter().any(|lhs| lhs.as_ident() == Some("msgServer"));
        }
        !has_server
    });
    if has_server {
        debug!("NewHandler already creates the message server");
    }

    // The dispatch is the switch with a `default:`; without one anywhere, the first switch
    let mut any_default = false;
    apply(&mut *body, |cursor| {
        if let Some(cases) = cursor.stmt().and_then(|stmt| switch_cases(&stmt.kind)) {
            any_default |= cases.iter().any(CaseClause::is_default);
        }
        !any_default
    });

    let mut clauses = Some(message_cases(opts));
    apply(&mut *body, |cursor| {
        if clauses.is_none() {
            return false;
        }
        let Some(stmt) = cursor.stmt_mut() else {
            return true;
        };
        let cases = match &mut stmt.kind {
            StmtKind::Switch(switch) => &mut switch.body,
            StmtKind::TypeSwitch(switch) => &mut switch.body,
            _ => return true,
        };
        if any_default && !cases.iter().any(CaseClause::is_default) {
            return true;
        }
        insert_before_default(cases, clauses.take().unwrap_or_default());

        let spacing = stmt.decor.before;
        if !has_server {
            let server = Assignment::define_variable("msgServer")
                .to([FunctionCall::new("keeper.NewMsgServerImpl").with_argument("k")]);
            cursor.insert_before(Stmt { decor: Decor { before: spacing, ..Decor::default() }, ..server });
        }
        false
    });

    if clauses.is_some() {
        return Err(RecipeError::anchor("message switch of \"NewHandler\""));
    }
    Ok(file)
}

fn switch_cases(kind: &StmtKind) -> Option<&[CaseClause]> {
    match kind {
        StmtKind::Switch(switch) => Some(switch.body.as_slice()),
        StmtKind::TypeSwitch(switch) => Some(switch.body.as_slice()),
        _ => None,
    }
}

/// `case *types.MsgCreateT:` and friends, each forwarding to the message server
fn message_cases(opts: &Options) -> Vec<CaseClause> {
    ACTIONS
        .iter()
        .map(|action| {
            let method = format!("{}{}", action, opts.type_name.upper_camel);
            let call = FunctionCall::new(&format!("msgServer.{}", method))
                .with_parameter(FunctionCall::new("sdk.WrapSDKContext").with_argument("ctx"))
                .with_argument("msg");
            let result = FunctionCall::new("sdk.WrapServiceResult").with_vars(&["ctx", "res", "err"]);
            CaseClause {
                list: vec![Expr::Star(Box::new(identifier(&format!("types.Msg{}", method))))],
                body: vec![Assignment::define_check("res").to([call]), Stmt::new(StmtKind::Return(vec![result.build()]))],
                decor: Decor::spaced(),
            }
        })
        .collect()
}

/// Insert in front of `default:`, or at the end when there is none
fn insert_before_default(cases: &mut Vec<CaseClause>, new: Vec<CaseClause>) {
    let idx = cases.iter().position(CaseClause::is_default).unwrap_or(cases.len());
    let count = new.len();
    cases.splice(idx..idx, new);
    if count > 0 {
        if let Some(default) = cases.get_mut(idx + count) {
            default.decor.before = Spacing::EmptyLine;
        }
    }
}
