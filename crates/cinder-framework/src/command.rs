//! Command descriptors.
//!
//! A [`CommandSpec`] is the immutable metadata record a plugin attaches to a
//! command handler at registration time: its canonical name, aliases, the
//! permissions the invoking user must hold, a priority for resolving name
//! collisions across plugins, and documentation fields. The core never looks
//! past this metadata — what the command *does* is entirely the handler's
//! business.

use cinder_core::{Permission, PermissionSet};

/// Immutable metadata for one registered command.
///
/// Built with a chain of builder methods and frozen once handed to
/// [`Registrar::register_command`](crate::plugin::Registrar::register_command):
///
/// ```rust,ignore
/// CommandSpec::new("editrole")
///     .alias("er")
///     .require("manage_roles")
///     .priority(5)
///     .category("roles")
///     .syntax("(role) [name=!\"…\"] [color=RRGGBB]")
///     .doc("Edits the name or color of an existing role.")
/// ```
///
/// Names and aliases may collide *across* plugins; the resolver breaks ties
/// by priority (higher wins) and then by plugin registration order.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    name: String,
    aliases: Vec<String>,
    perms: PermissionSet,
    priority: i32,
    run_anywhere: bool,
    delete_call: bool,
    category: String,
    syntax: String,
    doc: String,
}

impl CommandSpec {
    /// Creates a descriptor with the given canonical name and defaults:
    /// no aliases, no required permissions, priority 0, confined to command
    /// channels, category `"other"`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            perms: PermissionSet::new(),
            priority: 0,
            run_anywhere: false,
            delete_call: false,
            category: "other".to_string(),
            syntax: String::new(),
            doc: String::new(),
        }
    }

    /// Adds an alias the command also answers to.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds a permission the invoking user must hold.
    pub fn require(mut self, perm: impl Into<Permission>) -> Self {
        self.perms.insert(perm.into());
        self
    }

    /// Sets the resolution priority. Higher values win name collisions.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Allows the command in any channel, bypassing the command-channel
    /// scope restriction.
    pub fn run_anywhere(mut self, run_anywhere: bool) -> Self {
        self.run_anywhere = run_anywhere;
        self
    }

    /// Requests that the invoking message be deleted after dispatch.
    ///
    /// The core only carries this flag through to the launch outcome;
    /// deleting the message is the host collaborator's job.
    pub fn delete_call(mut self, delete_call: bool) -> Self {
        self.delete_call = delete_call;
        self
    }

    /// Sets the documentation category used for help grouping.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the human-readable usage syntax string.
    pub fn syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = syntax.into();
        self
    }

    /// Sets the human-readable description.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    /// The canonical command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases the command also answers to.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Permissions the invoking user must hold.
    pub fn perms(&self) -> &PermissionSet {
        &self.perms
    }

    /// Resolution priority.
    pub fn get_priority(&self) -> i32 {
        self.priority
    }

    /// Whether the command bypasses the command-channel restriction.
    pub fn is_run_anywhere(&self) -> bool {
        self.run_anywhere
    }

    /// Whether the invoking message should be deleted after dispatch.
    pub fn is_delete_call(&self) -> bool {
        self.delete_call
    }

    /// Documentation category.
    pub fn get_category(&self) -> &str {
        &self.category
    }

    /// Usage syntax string.
    pub fn get_syntax(&self) -> &str {
        &self.syntax
    }

    /// Human-readable description.
    pub fn get_doc(&self) -> &str {
        &self.doc
    }

    /// Returns `true` if `token` equals the canonical name or any alias.
    /// Matching is case-sensitive and exact.
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_name_and_aliases_exactly() {
        let spec = CommandSpec::new("purge").alias("prune").alias("clean");
        assert!(spec.matches("purge"));
        assert!(spec.matches("prune"));
        assert!(spec.matches("clean"));
        assert!(!spec.matches("Purge"));
        assert!(!spec.matches("purg"));
    }

    #[test]
    fn builder_defaults() {
        let spec = CommandSpec::new("ping");
        assert!(spec.perms().is_empty());
        assert_eq!(spec.get_priority(), 0);
        assert!(!spec.is_run_anywhere());
        assert!(!spec.is_delete_call());
        assert_eq!(spec.get_category(), "other");
    }

    #[test]
    fn builder_sets_fields() {
        let spec = CommandSpec::new("editrole")
            .require("manage_roles")
            .priority(5)
            .run_anywhere(true)
            .delete_call(true)
            .category("roles")
            .syntax("(role) [name=…]")
            .doc("Edits a role.");
        assert_eq!(spec.perms().len(), 1);
        assert_eq!(spec.get_priority(), 5);
        assert!(spec.is_run_anywhere());
        assert!(spec.is_delete_call());
        assert_eq!(spec.get_category(), "roles");
        assert_eq!(spec.get_syntax(), "(role) [name=…]");
    }
}
