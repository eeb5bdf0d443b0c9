use crate::application_port::CredentialError;
use sqlx::mysql::MySqlDatabaseError;

/// Translates an insert-time duplicate-key violation into the conflict for
/// the index it hit. The `user` table must carry the unique indexes
/// `uq_user_username` and `uq_user_email`; ER_DUP_ENTRY names the violated
/// key in its message.
pub fn dup_key_conflict(err: &sqlx::Error) -> Option<CredentialError> {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            if mysql_err.number() == 1062 {
                // ER_DUP_ENTRY
                let msg = mysql_err.message();
                if msg.contains("uq_user_username") {
                    return Some(CredentialError::UsernameTaken);
                }
                if msg.contains("uq_user_email") {
                    return Some(CredentialError::EmailTaken);
                }
                return Some(CredentialError::Store(msg.to_string()));
            }
        }
    }

    None
}
