use diesel::dsl::count_star;
use diesel::prelude::*;
use thiserror::Error;

use crate::db::{reaction::models::*, schema::reactions::dsl::*, DbError};

/// `(item_id, type, count)` for every reacted item among `ids`.
pub fn count_for_items(conn: &mut PgConnection, ids: &[String]) -> QueryResult<Vec<(String, String, i64)>> {
    reactions
        .filter(item_id.eq_any(ids))
        .group_by((item_id, reaction_type))
        .select((item_id, reaction_type, count_star()))
        .load(conn)
}

#[derive(Debug, Error)]
pub enum InsertReactionError {
    #[error("InsertReaction: {source}")]
    InsertReaction {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<InsertReactionError> for DbError {
    fn from(err: InsertReactionError) -> Self {
        let InsertReactionError::InsertReaction { source } = err;
        DbError::Write {
            operation: "InsertReaction",
            source,
        }
    }
}

pub fn insert_reaction(conn: &mut PgConnection, new: &NewReaction) -> Result<usize, InsertReactionError> {
    diesel::insert_into(reactions)
        .values(new)
        .on_conflict((item_id, reaction_type, user))
        .do_nothing()
        .execute(conn)
        .map_err(|source| InsertReactionError::InsertReaction { source })
}

pub fn delete_reaction(conn: &mut PgConnection, target: &NewReaction) -> QueryResult<usize> {
    diesel::delete(
        reactions
            .filter(item_id.eq(target.item_id))
            .filter(reaction_type.eq(target.reaction_type))
            .filter(user.eq(target.user)),
    )
    .execute(conn)
}
