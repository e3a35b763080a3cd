use super::*;
use std::path::PathBuf;

/// Recipes for one file, Go or protobuf
pub enum Target {
    Go(Sequence<File>),
    Proto(Sequence<ProtoFile>),
}

impl Target {
    pub fn len(&self) -> usize {
        match self {
            Target::Go(sequence) => sequence.len(),
            Target::Proto(sequence) => sequence.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<&'static str> {
        match self {
            Target::Go(sequence) => sequence.names().collect(),
            Target::Proto(sequence) => sequence.names().collect(),
        }
    }
}

/// A file of the application and what to do to it
pub struct Modification {
    /// Relative to the application root
    pub path: PathBuf,
    pub target: Target,
}

impl Modification {
    fn go(path: impl Into<PathBuf>, sequence: Sequence<File>) -> Self {
        Self { path: path.into(), target: Target::Go(sequence) }
    }

    fn proto(path: impl Into<PathBuf>, sequence: Sequence<ProtoFile>) -> Self {
        Self { path: path.into(), target: Target::Proto(sequence) }
    }

    /// Apply the recipes to the current content of the file
    pub fn run(&self, source: &str, opts: &Options) -> Result<String, MutateError> {
        match &self.target {
            Target::Go(sequence) => sequence.apply(source, &self.path, opts),
            Target::Proto(sequence) => sequence.apply(source, &self.path, opts),
        }
    }
}

/// Every file a list type touches, in the order they are edited.
///
/// Message related files are left out when `opts.no_message` is set.
pub fn list_type(opts: &Options) -> Vec<Modification> {
    let module = opts.module_name.as_str();
    let proto = PathBuf::from("proto").join(module);
    let x = PathBuf::from("x").join(module);

    let mut plan = vec![
        Modification::proto(proto.join("genesis.proto"), Sequence::new().step("genesis state", genesis_proto)),
        Modification::proto(proto.join("query.proto"), Sequence::new().step("query service", query_proto)),
        Modification::go(x.join("module.go"), Sequence::new().step("gateway routes", grpc_gateway_routes)),
        Modification::go(x.join("types").join("keys.go"), Sequence::new().step("store keys", store_keys)),
        Modification::go(x.join("client").join("cli").join("query.go"), Sequence::new().step("query commands", query_commands)),
        Modification::go(x.join("types").join("genesis.go"), {
            Sequence::new().step("default genesis", default_genesis).step("validate genesis", validate_genesis)
        }),
        Modification::go(x.join("genesis.go"), {
            Sequence::new().step("init genesis", init_genesis).step("export genesis", export_genesis)
        }),
        Modification::go(x.join("genesis_test.go"), Sequence::new().step("genesis test", genesis_test)),
        Modification::go(x.join("types").join("genesis_test.go"), {
            Sequence::new().step("genesis validation test", genesis_types_test)
        }),
    ];

    if !opts.no_message {
        plan.extend([
            Modification::go(x.join("handler.go"), Sequence::new().step("message handler", new_handler)),
            Modification::proto(proto.join("tx.proto"), Sequence::new().step("msg service", tx_proto)),
            Modification::go(x.join("types").join("codec.go"), {
                Sequence::new().step("amino codec", codec_register).step("interface registry", codec_interfaces)
            }),
            Modification::go(x.join("client").join("cli").join("tx.go"), Sequence::new().step("tx commands", tx_commands)),
            Modification::go(x.join("module_simulation.go"), {
                Sequence::new()
                    .step("simulation genesis", simulation_genesis)
                    .step("simulation weights", simulation_weights)
                    .step("simulation operations", simulation_operations)
            }),
        ]);
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(plan: &[Modification]) -> Vec<String> {
        plan.iter().map(|modification| modification.path.to_string_lossy().replace('\\', "/")).collect()
    }

    #[test]
    fn test_list_plan_covers_every_file() {
        let opts = Options::new("blog", "cosmonaut", "blog", "post").unwrap();
        let plan = list_type(&opts);
        assert_eq!(
            paths(&plan),
            vec![
                "proto/blog/genesis.proto",
                "proto/blog/query.proto",
                "x/blog/module.go",
                "x/blog/types/keys.go",
                "x/blog/client/cli/query.go",
                "x/blog/types/genesis.go",
                "x/blog/genesis.go",
                "x/blog/genesis_test.go",
                "x/blog/types/genesis_test.go",
                "x/blog/handler.go",
                "proto/blog/tx.proto",
                "x/blog/types/codec.go",
                "x/blog/client/cli/tx.go",
                "x/blog/module_simulation.go",
            ]
        );
        assert_eq!(plan.iter().map(|modification| modification.target.len()).sum::<usize>(), 19);
        assert_eq!(
            plan[13].target.names(),
            vec!["simulation genesis", "simulation weights", "simulation operations"]
        );
    }

    #[test]
    fn test_no_message_skips_message_files() {
        let mut opts = Options::new("blog", "cosmonaut", "blog", "post").unwrap();
        opts.no_message = true;
        let plan = list_type(&opts);
        assert_eq!(plan.len(), 9);
        assert!(!paths(&plan).iter().any(|path| path.ends_with("tx.proto") || path.ends_with("handler.go")));
        assert!(plan.iter().all(|modification| !modification.target.is_empty()));
    }

    #[test]
    fn test_errors_name_the_file() {
        let opts = Options::new("blog", "cosmonaut", "blog", "post").unwrap();
        let plan = list_type(&opts);
        let keys = plan.iter().find(|modification| modification.path.ends_with("keys.go")).unwrap();
        let out = keys.run("package types\n", &opts).unwrap();
        assert!(out.contains("PostCountKey = \"Post-count-\""));

        let module = plan.iter().find(|modification| modification.path.ends_with("module.go")).unwrap();
        let err = module.run("package blog\n", &opts).unwrap_err();
        assert!(err.to_string().contains("module.go"), "{}", err);
        assert!(err.to_string().contains("gateway routes"), "{}", err);
    }
}
