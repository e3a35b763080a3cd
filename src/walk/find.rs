use crate::ast::go::{Expr, File, FuncDecl};
use crate::error::LookupError;

/// First function named `name` that has no receiver
pub fn find_function<'f>(file: &'f File, name: &str) -> Result<&'f FuncDecl, LookupError> {
    file.functions()
        .find(|func| func.recv.is_none() && func.name == name)
        .ok_or_else(|| LookupError::FunctionNotFound(name.to_string()))
}

pub fn find_function_mut<'f>(file: &'f mut File, name: &str) -> Result<&'f mut FuncDecl, LookupError> {
    functions_mut(file)
        .find(|func| func.recv.is_none() && func.name == name)
        .ok_or_else(|| LookupError::FunctionNotFound(name.to_string()))
}

/// Method located by `"Receiver.Name"`.
///
/// Pointer and value receivers both match. A qualified receiver such as
/// `"pkg.Type.Name"` is compared against the flattened receiver type.
pub fn find_method<'f>(file: &'f File, name: &str) -> Result<&'f FuncDecl, LookupError> {
    let (receiver, method) = split_method_name(name)?;
    file.functions()
        .find(|func| func.name == method && receiver_matches(func, &receiver))
        .ok_or_else(|| LookupError::MethodNotFound { receiver: receiver.join("."), name: method.to_string() })
}

pub fn find_method_mut<'f>(file: &'f mut File, name: &str) -> Result<&'f mut FuncDecl, LookupError> {
    let (receiver, method) = split_method_name(name)?;
    functions_mut(file)
        .find(|func| func.name == method && receiver_matches(func, &receiver))
        .ok_or_else(|| LookupError::MethodNotFound { receiver: receiver.join("."), name: method.to_string() })
}

fn functions_mut(file: &mut File) -> impl Iterator<Item = &mut FuncDecl> {
    file.decls.iter_mut().filter_map(|decl| match decl {
        crate::ast::go::Decl::Func(func) => Some(func),
        crate::ast::go::Decl::Gen(_) => None,
    })
}

fn split_method_name(name: &str) -> Result<(Vec<&str>, &str), LookupError> {
    let Some((receiver, method)) = name.rsplit_once('.') else {
        return Err(LookupError::InvalidMethodName(name.to_string()));
    };
    if method.is_empty() {
        return Err(LookupError::InvalidMethodName(name.to_string()));
    }
    let receiver: Vec<&str> = receiver.split('.').collect();
    if receiver.iter().any(|part| part.is_empty()) {
        return Err(LookupError::InvalidMethodReceiver(name.to_string()));
    }
    Ok((receiver, method))
}

fn receiver_matches(func: &FuncDecl, receiver: &[&str]) -> bool {
    let Some(recv) = &func.recv else {
        return false;
    };
    receiver_type(&recv.ty).is_some_and(|parts| parts == receiver)
}

/// Receiver type with pointers and type arguments stripped
fn receiver_type(ty: &Expr) -> Option<Vec<&str>> {
    match ty {
        Expr::Star(inner) | Expr::Paren(inner) => receiver_type(inner),
        Expr::Index { x, .. } => receiver_type(x),
        other => other.flatten_selector(),
    }
}
