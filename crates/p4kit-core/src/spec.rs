use crate::escape::view_escape;

pub const CHANGELIST_DESCRIPTION: &str = "p4kit generated changelist.";
pub const TEMP_BRANCH_DESCRIPTION: &str = "Temporary branch spec generated by p4kit. \
It can be safely deleted if no p4kit commands are running.";

/// One `source dest` line of a branch view. Order inside a view is precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry {
    pub source: String,
    pub dest: String,
}

impl ViewEntry {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    fn render(&self) -> String {
        format!("\t{} {}\n", view_escape(&self.source), view_escape(&self.dest))
    }
}

/// Form fed to `p4 change -i` to open a new pending changelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelistSpec {
    pub client: String,
    pub user: String,
    pub description: String,
}

impl ChangelistSpec {
    pub fn new(client: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            user: user.into(),
            description: CHANGELIST_DESCRIPTION.to_string(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Change: new\n\nClient: {client}\n\nUser: {user}\n\nStatus: new\n\nDescription:\n\t{description}\n\n",
            client = self.client,
            user = self.user,
            description = self.description
        )
    }
}

/// Form fed to `p4 branch -i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSpec {
    pub name: String,
    pub owner: String,
    pub description: String,
    pub view: Vec<ViewEntry>,
}

impl BranchSpec {
    pub fn new(name: impl Into<String>, owner: impl Into<String>, view: Vec<ViewEntry>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            description: TEMP_BRANCH_DESCRIPTION.to_string(),
            view,
        }
    }

    pub fn render(&self) -> String {
        let view: String = self.view.iter().map(ViewEntry::render).collect();
        format!(
            "Branch: {name}\n\nOwner: {owner}\n\nDescription:\n\t{description}\n\nOptions: unlocked\n\nView:\n{view}\n",
            name = self.name,
            owner = self.owner,
            description = self.description,
            view = view
        )
    }
}

pub fn changelist_spec(client: &str, user: &str) -> String {
    ChangelistSpec::new(client, user).render()
}

pub fn branch_spec(name: &str, owner: &str, view: &[ViewEntry]) -> String {
    BranchSpec::new(name, owner, view.to_vec()).render()
}
