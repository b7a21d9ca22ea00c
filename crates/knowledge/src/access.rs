//! Role-based access table.
//!
//! Maps each role to the document departments it may read, and answers the
//! inverse question at ingestion time: which roles may read a department.
//! The table is data (`config/access.yaml` or `.clearance/access.yaml`), loaded
//! once and immutable afterwards.

use clearance_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Access table schema versions this build understands.
pub const SUPPORTED_VERSION: u32 = 1;

/// Built-in access table, shipped as data.
const BUILTIN_ACCESS_YAML: &str = include_str!("../config/access.yaml");

fn normalise(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A role identifier, trimmed and lowercased.
///
/// Constructing a `Role` does not make it valid; use
/// [`RoleAccessTable::role`] to resolve caller input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Role(String);

impl Role {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalise(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document department, trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Department(String);

impl Department {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalise(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Department {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<Department> for String {
    fn from(department: Department) -> Self {
        department.0
    }
}

impl AsRef<str> for Department {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// On-disk shape of the access table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AccessDocument {
    version: u32,

    /// Declared department universe; derived from `roles` when absent
    #[serde(default)]
    departments: Option<Vec<String>>,

    roles: BTreeMap<String, Vec<String>>,
}

/// Validated mapping from role to readable departments.
#[derive(Debug, Clone, Serialize)]
pub struct RoleAccessTable {
    version: u32,
    departments: BTreeSet<Department>,
    roles: BTreeMap<Role, BTreeSet<Department>>,
}

impl RoleAccessTable {
    /// Parse and validate an access table from YAML.
    pub fn from_yaml(yaml: &str) -> AppResult<Self> {
        let doc: AccessDocument = serde_yaml::from_str(yaml)
            .map_err(|e| AppError::Config(format!("Failed to parse access table: {}", e)))?;
        Self::from_document(doc)
    }

    /// Load an access table from a file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read access table {:?}: {}", path, e))
        })?;
        let table = Self::from_yaml(&content)?;
        tracing::debug!(
            "Loaded access table from {:?}: {} roles, {} departments",
            path,
            table.roles.len(),
            table.departments.len()
        );
        Ok(table)
    }

    /// The access table shipped with the crate.
    pub fn builtin() -> AppResult<Self> {
        Self::from_yaml(BUILTIN_ACCESS_YAML)
    }

    /// Load `.clearance/access.yaml` if the workspace has one, else the built-in table.
    pub fn load_or_builtin(workspace: &Path) -> AppResult<Self> {
        let path = access_path(workspace);
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!("No access table at {:?}, using built-in table", path);
            Self::builtin()
        }
    }

    fn from_document(doc: AccessDocument) -> AppResult<Self> {
        if doc.version != SUPPORTED_VERSION {
            return Err(AppError::Config(format!(
                "Unsupported access table version {} (expected {})",
                doc.version, SUPPORTED_VERSION
            )));
        }

        if doc.roles.is_empty() {
            return Err(AppError::Config(
                "Access table must define at least one role".to_string(),
            ));
        }

        let mut roles: BTreeMap<Role, BTreeSet<Department>> = BTreeMap::new();
        for (raw_role, raw_departments) in doc.roles {
            let role = Role::new(&raw_role);
            if role.as_str().is_empty() {
                return Err(AppError::Config("Role names cannot be empty".to_string()));
            }

            let mut allowed = BTreeSet::new();
            for raw in raw_departments {
                let department = Department::new(&raw);
                if department.as_str().is_empty() {
                    return Err(AppError::Config(format!(
                        "Role '{}' lists an empty department name",
                        role
                    )));
                }
                allowed.insert(department);
            }

            if allowed.is_empty() {
                return Err(AppError::Config(format!(
                    "Role '{}' must be allowed at least one department",
                    role
                )));
            }

            if roles.insert(role.clone(), allowed).is_some() {
                return Err(AppError::Config(format!(
                    "Role '{}' is defined more than once",
                    role
                )));
            }
        }

        let referenced: BTreeSet<Department> = roles.values().flatten().cloned().collect();

        let departments = match doc.departments {
            Some(declared) => {
                let declared: BTreeSet<Department> =
                    declared.iter().map(Department::new).collect();

                if let Some(unknown) = referenced.difference(&declared).next() {
                    return Err(AppError::Config(format!(
                        "Department '{}' is granted to a role but not declared in departments",
                        unknown
                    )));
                }
                if let Some(orphan) = declared.difference(&referenced).next() {
                    return Err(AppError::Config(format!(
                        "Department '{}' is not readable by any role",
                        orphan
                    )));
                }
                declared
            }
            None => referenced,
        };

        Ok(Self {
            version: doc.version,
            departments,
            roles,
        })
    }

    /// Resolve caller input to a known role.
    pub fn role(&self, raw: &str) -> AppResult<Role> {
        let role = Role::new(raw);
        if self.roles.contains_key(&role) {
            Ok(role)
        } else {
            Err(AppError::InvalidRole(format!(
                "'{}' is not a known role (known roles: {})",
                raw.trim(),
                self.role_names().join(", ")
            )))
        }
    }

    /// Departments a role may read. Never empty for a known role.
    pub fn allowed_departments(&self, role: impl AsRef<str>) -> AppResult<&BTreeSet<Department>> {
        let role = self.role(role.as_ref())?;
        self.roles.get(&role).ok_or_else(|| {
            AppError::InvalidRole(format!("'{}' is not a known role", role))
        })
    }

    /// Every role whose allowed set contains `department`, sorted.
    ///
    /// Empty when the department is outside the universe.
    pub fn roles_for_department(&self, department: &Department) -> BTreeSet<Role> {
        self.roles
            .iter()
            .filter(|(_, allowed)| allowed.contains(department))
            .map(|(role, _)| role.clone())
            .collect()
    }

    pub fn contains_department(&self, department: &Department) -> bool {
        self.departments.contains(department)
    }

    /// The department universe.
    pub fn departments(&self) -> &BTreeSet<Department> {
        &self.departments
    }

    /// Roles and their allowed departments, in role order.
    pub fn roles(&self) -> impl Iterator<Item = (&Role, &BTreeSet<Department>)> {
        self.roles.iter()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn role_names(&self) -> Vec<&str> {
        self.roles.keys().map(Role::as_str).collect()
    }
}

/// Path of the workspace override for the access table.
pub fn access_path(workspace: &Path) -> PathBuf {
    workspace.join(".clearance").join("access.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn departments(names: &[&str]) -> BTreeSet<Department> {
        names.iter().map(Department::new).collect()
    }

    fn roles(names: &[&str]) -> BTreeSet<Role> {
        names.iter().map(Role::new).collect()
    }

    #[test]
    fn test_builtin_table() {
        let table = RoleAccessTable::builtin().unwrap();
        assert_eq!(table.version(), 1);
        assert_eq!(
            table.departments(),
            &departments(&["engineering", "finance", "general", "hr", "marketing"])
        );
        assert_eq!(
            table.allowed_departments("employees").unwrap(),
            &departments(&["general"])
        );
        assert_eq!(table.allowed_departments("c_level").unwrap().len(), 5);
    }

    #[test]
    fn test_roles_for_department_is_sorted_and_exact() {
        let table = RoleAccessTable::builtin().unwrap();

        let finance: Vec<Role> = table
            .roles_for_department(&Department::new("finance"))
            .into_iter()
            .collect();
        assert_eq!(finance, vec![Role::new("c_level"), Role::new("finance")]);

        assert!(table
            .roles_for_department(&Department::new("legal"))
            .is_empty());
    }

    #[test]
    fn test_unknown_role_is_invalid() {
        let table = RoleAccessTable::builtin().unwrap();

        let err = table.allowed_departments("intern").unwrap_err();
        assert!(matches!(err, AppError::InvalidRole(_)));

        let err = table.role("").unwrap_err();
        assert!(matches!(err, AppError::InvalidRole(_)));
    }

    #[test]
    fn test_role_input_is_normalised() {
        let table = RoleAccessTable::builtin().unwrap();
        assert_eq!(table.role("  Finance ").unwrap(), Role::new("finance"));
    }

    #[test]
    fn test_substring_roles_do_not_overlap() {
        let table = RoleAccessTable::from_yaml(
            r#"
version: 1
roles:
  fin: [treasury]
  finance: [finance]
  finance_lead: [finance, treasury]
"#,
        )
        .unwrap();

        assert_eq!(
            table.roles_for_department(&Department::new("finance")),
            roles(&["finance", "finance_lead"])
        );
        assert_eq!(
            table.roles_for_department(&Department::new("treasury")),
            roles(&["fin", "finance_lead"])
        );
        assert!(table.role("fina").is_err());
    }

    #[test]
    fn test_role_without_departments_is_rejected() {
        let err = RoleAccessTable::from_yaml(
            r#"
version: 1
roles:
  finance: []
"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("at least one department"));
    }

    #[test]
    fn test_orphan_department_is_rejected() {
        let err = RoleAccessTable::from_yaml(
            r#"
version: 1
departments: [finance, legal]
roles:
  finance: [finance]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("legal"));
    }

    #[test]
    fn test_undeclared_department_is_rejected() {
        let err = RoleAccessTable::from_yaml(
            r#"
version: 1
departments: [finance]
roles:
  finance: [finance, legal]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("legal"));
    }

    #[test]
    fn test_duplicate_role_after_normalisation_is_rejected() {
        let err = RoleAccessTable::from_yaml(
            r#"
version: 1
roles:
  Finance: [finance]
  finance: [finance]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_unsupported_version() {
        let err = RoleAccessTable::from_yaml("version: 2\nroles:\n  a: [b]\n").unwrap_err();
        assert!(err.to_string().contains("Unsupported access table version"));
    }

    #[test]
    fn test_load_or_builtin_prefers_workspace_file() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            RoleAccessTable::load_or_builtin(temp.path())
                .unwrap()
                .roles()
                .count(),
            6
        );

        let path = access_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "version: 1\nroles:\n  auditor: [finance, hr]\n").unwrap();

        let table = RoleAccessTable::load_or_builtin(temp.path()).unwrap();
        assert_eq!(table.roles().count(), 1);
        assert_eq!(table.departments(), &departments(&["finance", "hr"]));
    }
}
