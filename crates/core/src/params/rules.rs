use std::fmt;

/// A node of the parameter rule algebra.
///
/// Rules are built once per command and describe the admissible set of
/// parameter keys. They never look at values; that is the validators' job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// A required key. `suggested` marks it as a completion hint.
    Key { name: String, suggested: bool },
    /// Optional keys; `suggested` is the subset offered as completion hints.
    Opt {
        keys: Vec<String>,
        suggested: Vec<String>,
    },
    AllOf(Vec<Rule>),
    OnlyOneOf(Vec<Rule>),
    AtLeastOneOf(Vec<Rule>),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("unexpected param(s): {}", .0.join(", "))]
    Unexpected(Vec<String>),

    #[error("missing required param '{0}'")]
    Missing(String),

    #[error("{0}")]
    Violation(String),
}

/// Which optional keys [`Rule::suggested_keys`] should propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestMode {
    /// Only keys explicitly tagged as suggested.
    Defaults,
    /// No optional keys at all.
    Nothing,
    /// Every absent optional key.
    All,
}

/// Evaluation result of a single node. `Opt` is neither a pass nor a fail:
/// it counts as satisfied inside `AllOf` and `AtLeastOneOf` but not inside
/// `OnlyOneOf`.
enum Outcome {
    Pass,
    Opt,
    Fail(RuleError),
}

// ──────────────────────────────────────────────
// Constructors
// ──────────────────────────────────────────────

impl Rule {
    pub fn key(name: &str) -> Rule {
        Rule::Key {
            name: name.to_string(),
            suggested: false,
        }
    }

    pub fn suggested_key(name: &str) -> Rule {
        Rule::Key {
            name: name.to_string(),
            suggested: true,
        }
    }

    pub fn opt(keys: &[&str]) -> Rule {
        Rule::opt_with(keys, &[])
    }

    /// Optional keys that are all offered as completion hints.
    pub fn suggested(keys: &[&str]) -> Rule {
        Rule::opt_with(&[], keys)
    }

    /// Optional keys followed by suggested optional keys.
    pub fn opt_with(optional: &[&str], suggested: &[&str]) -> Rule {
        let mut keys: Vec<String> = optional.iter().map(|s| s.to_string()).collect();
        keys.extend(suggested.iter().map(|s| s.to_string()));
        Rule::Opt {
            keys,
            suggested: suggested.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn all_of(rules: Vec<Rule>) -> Rule {
        Rule::AllOf(rules)
    }

    pub fn only_one_of(rules: Vec<Rule>) -> Rule {
        Rule::OnlyOneOf(rules)
    }

    pub fn at_least_one_of(rules: Vec<Rule>) -> Rule {
        Rule::AtLeastOneOf(rules)
    }
}

// ──────────────────────────────────────────────
// Operations
// ──────────────────────────────────────────────

impl Rule {
    /// Check `given` against the rule. Keys the rule never mentions are
    /// rejected before the combinators are evaluated.
    pub fn run<S: AsRef<str>>(&self, given: &[S]) -> Result<(), RuleError> {
        let given: Vec<&str> = given.iter().map(|s| s.as_ref()).collect();
        self.check_unexpected(&given)?;
        match self.eval(&given) {
            Outcome::Fail(err) => Err(err),
            Outcome::Pass | Outcome::Opt => Ok(()),
        }
    }

    /// Reject keys the rule never mentions.
    pub fn check_unexpected<S: AsRef<str>>(&self, given: &[S]) -> Result<(), RuleError> {
        let given: Vec<&str> = given.iter().map(|s| s.as_ref()).collect();
        let (required, optional, _) = self.list();
        let unexpected: Vec<String> = given
            .iter()
            .filter(|k| {
                !required.iter().any(|r| r.as_str() == **k)
                    && !optional.iter().any(|o| o.as_str() == **k)
            })
            .map(|k| k.to_string())
            .collect();
        if unexpected.is_empty() {
            Ok(())
        } else {
            Err(RuleError::Unexpected(unexpected))
        }
    }

    fn eval(&self, given: &[&str]) -> Outcome {
        match self {
            Rule::Key { name, .. } => {
                if given.contains(&name.as_str()) {
                    Outcome::Pass
                } else {
                    Outcome::Fail(RuleError::Missing(name.clone()))
                }
            }
            Rule::Opt { .. } => Outcome::Opt,
            Rule::None => Outcome::Pass,
            Rule::AllOf(children) => {
                for child in children {
                    if let Outcome::Fail(err) = child.eval(given) {
                        if matches!(child, Rule::AllOf(_)) {
                            return Outcome::Fail(err);
                        }
                        return Outcome::Fail(RuleError::Violation(format!(
                            "{}: expecting {}",
                            err, self
                        )));
                    }
                }
                Outcome::Pass
            }
            Rule::OnlyOneOf(children) => {
                if children.is_empty() {
                    return Outcome::Pass;
                }
                let passed = children
                    .iter()
                    .filter(|c| matches!(c.eval(given), Outcome::Pass))
                    .count();
                match passed {
                    1 => Outcome::Pass,
                    0 => Outcome::Fail(RuleError::Violation(format!(
                        "expecting one of {}",
                        self
                    ))),
                    _ => Outcome::Fail(RuleError::Violation(format!(
                        "only one of {} is allowed",
                        self
                    ))),
                }
            }
            Rule::AtLeastOneOf(children) => {
                if children.is_empty() {
                    return Outcome::Pass;
                }
                let any = children
                    .iter()
                    .any(|c| !matches!(c.eval(given), Outcome::Fail(_)));
                if any {
                    Outcome::Pass
                } else {
                    Outcome::Fail(RuleError::Violation(format!(
                        "expecting at least one of {}",
                        self
                    )))
                }
            }
        }
    }

    /// Keys an interactive layer should still ask for. For exclusive
    /// combinators the first alternative is proposed.
    ///
    /// Only absent keys are reported. A set that fails [`run`](Self::run)
    /// because it has too many keys (an unexpected one, or two alternatives
    /// of `OnlyOneOf`) has nothing missing.
    pub fn missing<S: AsRef<str>>(&self, given: &[S]) -> Vec<String> {
        let given: Vec<&str> = given.iter().map(|s| s.as_ref()).collect();
        let mut out = Vec::new();
        self.collect_missing(&given, &mut out);
        out
    }

    fn collect_missing(&self, given: &[&str], out: &mut Vec<String>) {
        match self {
            Rule::Key { name, .. } => {
                if !given.contains(&name.as_str()) {
                    push_unique(out, name);
                }
            }
            Rule::AllOf(children) => {
                for c in children {
                    c.collect_missing(given, out);
                }
            }
            Rule::OnlyOneOf(children) | Rule::AtLeastOneOf(children) => {
                if let (Outcome::Fail(_), Some(first)) = (self.eval(given), children.first()) {
                    first.collect_missing(given, out);
                }
            }
            Rule::Opt { .. } | Rule::None => {}
        }
    }

    /// The canonical minimal set of required keys.
    pub fn required(&self) -> Vec<String> {
        match self {
            Rule::Key { name, .. } => vec![name.clone()],
            Rule::AllOf(children) => {
                let mut out = Vec::new();
                for c in children {
                    for k in c.required() {
                        push_unique(&mut out, &k);
                    }
                }
                out
            }
            Rule::OnlyOneOf(children) | Rule::AtLeastOneOf(children) => children
                .first()
                .map(|c| c.required())
                .unwrap_or_default(),
            Rule::Opt { .. } | Rule::None => Vec::new(),
        }
    }

    /// Every key the rule mentions, as sorted `(required, optional, suggested)`.
    pub fn list(&self) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut required = Vec::new();
        let mut optional = Vec::new();
        let mut suggested = Vec::new();
        self.visit(&mut |r| match r {
            Rule::Key { name, .. } => required.push(name.clone()),
            Rule::Opt {
                keys,
                suggested: sug,
            } => {
                optional.extend(keys.iter().cloned());
                suggested.extend(sug.iter().cloned());
            }
            _ => {}
        });
        for v in [&mut required, &mut optional, &mut suggested] {
            v.sort();
            v.dedup();
        }
        (required, optional, suggested)
    }

    /// Absent keys worth proposing for completion.
    pub fn suggested_keys<S: AsRef<str>>(&self, given: &[S], mode: SuggestMode) -> Vec<String> {
        let given: Vec<&str> = given.iter().map(|s| s.as_ref()).collect();
        let mut out = Vec::new();
        self.visit(&mut |r| match r {
            Rule::Key {
                name,
                suggested: true,
            } if !given.contains(&name.as_str()) => push_unique(&mut out, name),
            Rule::Opt { keys, suggested } => {
                for k in keys {
                    let wanted = match mode {
                        SuggestMode::All => true,
                        SuggestMode::Defaults => suggested.contains(k),
                        SuggestMode::Nothing => false,
                    };
                    if wanted && !given.contains(&k.as_str()) {
                        push_unique(&mut out, k);
                    }
                }
            }
            _ => {}
        });
        out
    }

    /// Pre-order traversal over the rule tree.
    pub fn visit<F: FnMut(&Rule)>(&self, f: &mut F) {
        f(self);
        if let Rule::AllOf(children) | Rule::OnlyOneOf(children) | Rule::AtLeastOneOf(children) =
            self
        {
            for c in children {
                c.visit(f);
            }
        }
    }
}

fn push_unique(out: &mut Vec<String>, key: &str) {
    if !out.iter().any(|k| k == key) {
        out.push(key.to_string());
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(rules: &[Rule], sep: &str) -> String {
            rules
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(sep)
        }
        match self {
            Rule::Key { name, .. } => write!(f, "{}", name),
            Rule::Opt { keys, .. } => write!(f, "[{}]", keys.join(" ")),
            Rule::AllOf(children) => write!(f, "{}", join(children, " + ")),
            Rule::OnlyOneOf(children) => write!(f, "({})", join(children, " | ")),
            Rule::AtLeastOneOf(children) => write!(f, "({})", join(children, " / ")),
            Rule::None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(name: &str) -> Rule {
        Rule::key(name)
    }

    const NONE: &[&str] = &[];

    #[test]
    fn empty_combinators_pass() {
        for r in [
            Rule::all_of(vec![]),
            Rule::only_one_of(vec![]),
            Rule::at_least_one_of(vec![]),
        ] {
            assert_eq!(r.run(NONE), Ok(()));
            assert!(r.missing(NONE).is_empty());
        }
    }

    #[test]
    fn prints_rules() {
        let r = Rule::all_of(vec![
            k("1"),
            k("2"),
            Rule::only_one_of(vec![k("3"), k("4")]),
            Rule::at_least_one_of(vec![k("5"), k("6")]),
        ]);
        assert_eq!(r.to_string(), "1 + 2 + (3 | 4) + (5 / 6)");

        let r = Rule::all_of(vec![
            Rule::only_one_of(vec![k("user"), k("group"), k("role")]),
            Rule::only_one_of(vec![k("arn"), Rule::all_of(vec![k("service"), k("access")])]),
        ]);
        assert_eq!(r.to_string(), "(user | group | role) + (arn | service + access)");
        assert_eq!(Rule::opt(&["a", "b"]).to_string(), "[a b]");
        assert_eq!(Rule::None.to_string(), "none");
    }

    #[test]
    fn lists_sorted_keys() {
        let (req, opt, sug) = Rule::opt(&["b", "c", "a"]).list();
        assert!(req.is_empty());
        assert_eq!(opt, vec!["a", "b", "c"]);
        assert!(sug.is_empty());

        let r = Rule::all_of(vec![k("f"), Rule::opt_with(&["a"], &["b"])]);
        let (req, opt, sug) = r.list();
        assert_eq!(req, vec!["f"]);
        assert_eq!(opt, vec!["a", "b"]);
        assert_eq!(sug, vec!["b"]);

        let r = Rule::at_least_one_of(vec![k("c"), k("b"), Rule::suggested(&["f", "a"])]);
        let (req, opt, sug) = r.list();
        assert_eq!(req, vec!["b", "c"]);
        assert_eq!(opt, vec!["a", "f"]);
        assert_eq!(sug, vec!["a", "f"]);
    }

    #[test]
    fn combinator_semantics() {
        let only = Rule::only_one_of(vec![k("1"), k("2")]);
        assert_eq!(only.run(&["1"]), Ok(()));
        assert_eq!(only.run(&["2"]), Ok(()));
        let msg = only.run(&["1", "2"]).unwrap_err().to_string();
        assert!(msg.contains("only one of (1 | 2)"), "{msg}");
        assert!(only.run(NONE).is_err());

        let least = Rule::at_least_one_of(vec![k("1"), k("2")]);
        assert_eq!(least.run(&["1", "2"]), Ok(()));
        let msg = least.run(NONE).unwrap_err().to_string();
        assert!(msg.contains('1') && msg.contains('2'), "{msg}");

        let all = Rule::all_of(vec![k("1"), k("2")]);
        assert_eq!(all.run(&["1", "2"]), Ok(()));
        assert!(all.run(&["1"]).unwrap_err().to_string().contains('2'));
    }

    #[test]
    fn opt_counts_only_where_allowed() {
        let r = Rule::only_one_of(vec![
            Rule::all_of(vec![k("instance"), k("id")]),
            k("attachment"),
            Rule::opt(&["force"]),
        ]);
        assert_eq!(r.run(&["attachment"]), Ok(()));
        assert!(r.run(&["force"]).is_err());

        let r = Rule::at_least_one_of(vec![k("a"), Rule::opt(&["b"])]);
        assert_eq!(r.run(NONE), Ok(()));
    }

    #[test]
    fn all_of_failure_names_the_rule() {
        let r = Rule::all_of(vec![Rule::only_one_of(vec![k("1"), k("2")]), k("3")]);
        let msg = r.run(NONE).unwrap_err().to_string();
        assert_eq!(msg, "expecting one of (1 | 2): expecting (1 | 2) + 3");

        let r = Rule::all_of(vec![k("name"), Rule::opt(&["acl"])]);
        assert_eq!(
            r.run(&["acl"]).unwrap_err().to_string(),
            "missing required param 'name': expecting name + [acl]"
        );
    }

    #[test]
    fn unexpected_keys_rejected_first() {
        let r = Rule::all_of(vec![k("1"), k("2")]);
        assert_eq!(
            r.run(&["3", "4"]),
            Err(RuleError::Unexpected(vec!["3".into(), "4".into()]))
        );
        assert_eq!(
            r.run(&["3"]).unwrap_err().to_string(),
            "unexpected param(s): 3"
        );
        assert!(Rule::None.run(&["x"]).is_err());
        assert_eq!(Rule::None.run(NONE), Ok(()));
    }

    #[test]
    fn missing_follows_first_child() {
        assert_eq!(Rule::all_of(vec![k("2"), k("1")]).missing(NONE), vec!["2", "1"]);
        assert_eq!(Rule::only_one_of(vec![k("2"), k("1")]).missing(NONE), vec!["2"]);
        assert_eq!(Rule::at_least_one_of(vec![k("2"), k("1")]).missing(NONE), vec!["2"]);

        let nested = Rule::only_one_of(vec![
            Rule::only_one_of(vec![k("1"), k("2")]),
            k("5"),
            Rule::at_least_one_of(vec![k("3"), k("4")]),
        ]);
        assert_eq!(nested.missing(NONE), vec!["1"]);

        let r = Rule::all_of(vec![
            k("5"),
            Rule::only_one_of(vec![k("1"), k("2")]),
            Rule::at_least_one_of(vec![k("3"), k("4")]),
        ]);
        assert_eq!(r.missing(NONE), vec!["5", "1", "3"]);
        assert_eq!(r.missing(&["5"]), vec!["1", "3"]);
        assert_eq!(r.missing(&["5", "1"]), vec!["3"]);
        assert_eq!(r.missing(&["5", "3"]), vec!["1"]);
        assert!(r.missing(&["5", "3", "2"]).is_empty());
    }

    #[test]
    fn required_follows_first_child() {
        let r = Rule::all_of(vec![
            k("5"),
            Rule::only_one_of(vec![k("1"), k("2")]),
            Rule::at_least_one_of(vec![k("3"), k("4")]),
        ]);
        assert_eq!(r.required(), vec!["5", "1", "3"]);

        let r = Rule::only_one_of(vec![
            Rule::at_least_one_of(vec![k("3"), k("4")]),
            Rule::all_of(vec![k("1"), k("2")]),
        ]);
        assert_eq!(r.required(), vec!["3"]);
        assert!(Rule::opt(&["a"]).required().is_empty());
    }

    #[test]
    fn missing_empty_iff_run_ok() {
        let rule = Rule::all_of(vec![
            k("name"),
            Rule::at_least_one_of(vec![k("cidr"), k("ip")]),
            Rule::opt(&["tag"]),
        ]);
        let sets: &[&[&str]] = &[
            &[],
            &["name"],
            &["name", "cidr"],
            &["name", "ip", "cidr"],
            &["tag"],
            &["name", "tag", "ip"],
        ];
        for given in sets {
            assert_eq!(
                rule.run(*given).is_ok(),
                rule.missing(*given).is_empty(),
                "{given:?}"
            );
        }
    }

    #[test]
    fn surplus_keys_fail_without_anything_missing() {
        let only = Rule::only_one_of(vec![k("1"), k("2")]);
        assert!(only.run(&["1", "2"]).is_err());
        assert!(only.missing(&["1", "2"]).is_empty());

        let rule = Rule::all_of(vec![k("name"), Rule::opt(&["tag"])]);
        assert_eq!(
            rule.run(&["name", "color"]),
            Err(RuleError::Unexpected(vec!["color".into()]))
        );
        assert!(rule.missing(&["name", "color"]).is_empty());
    }

    #[test]
    fn suggestions_by_mode() {
        let r = Rule::all_of(vec![
            Rule::suggested_key("name"),
            k("id"),
            Rule::opt_with(&["a"], &["b"]),
        ]);
        assert_eq!(r.suggested_keys(NONE, SuggestMode::Defaults), vec!["name", "b"]);
        assert_eq!(r.suggested_keys(&["name"], SuggestMode::All), vec!["a", "b"]);
        assert!(r.suggested_keys(&["name"], SuggestMode::Nothing).is_empty());
    }

    #[test]
    fn visit_is_pre_order() {
        let r = Rule::all_of(vec![k("a"), Rule::only_one_of(vec![k("b")])]);
        let mut seen = Vec::new();
        r.visit(&mut |n| seen.push(n.to_string()));
        assert_eq!(seen, vec!["a + (b)", "a", "(b)", "b"]);
    }
}
