use diesel::prelude::*;

use crate::db::schema::follows;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollow<'a> {
    pub follower_github_login: &'a str,
    pub target_github_login: &'a str,
}
