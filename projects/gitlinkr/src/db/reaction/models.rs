use diesel::prelude::*;

use crate::db::schema::reactions;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reactions)]
pub struct NewReaction<'a> {
    pub item_id: &'a str,
    pub reaction_type: &'a str,
    pub user: &'a str,
}
