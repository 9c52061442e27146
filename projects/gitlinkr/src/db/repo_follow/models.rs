use diesel::prelude::*;

use crate::db::schema::repo_follows;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = repo_follows)]
pub struct NewRepoFollow<'a> {
    pub follower_github_login: &'a str,
    pub repo_full_name: &'a str,
}
