use crate::models::user::User;
use crate::schema::users;
use diesel::prelude::*;
use diesel::result::Error;

#[derive(Insertable)]
#[diesel(table_name = users)]
struct NewUser {
    name: String,
}

pub fn create(conn: &mut PgConnection, name: String) -> Result<User, Error> {
    let new_user = NewUser {
        name: name.trim().to_string(),
    };

    diesel::insert_into(users::table)
        .values(new_user)
        .get_result::<User>(conn)
}

pub fn find_by_name(conn: &mut PgConnection, name: &str) -> Option<User> {
    match users::table
        .filter(users::name.eq(name))
        .first::<User>(conn)
    {
        Ok(record) => Some(record),
        _ => None,
    }
}

pub fn all(conn: &mut PgConnection) -> Result<Vec<User>, Error> {
    users::table.order(users::name).load::<User>(conn)
}

pub fn delete_all(conn: &mut PgConnection) -> Result<usize, Error> {
    diesel::delete(users::table).execute(conn)
}

#[cfg(test)]
mod tests {
    use crate::db;
    use diesel::connection::Connection;
    use diesel::result::Error;

    #[test]
    #[ignore]
    fn create_creates_new_user() {
        let mut connection = db::establish_test_connection();

        connection.test_transaction::<_, Error, _>(|connection| {
            let user = super::create(connection, "ayrat".to_string()).unwrap();

            assert_eq!(user.name, "ayrat");

            Ok(())
        });
    }

    #[test]
    #[ignore]
    fn create_fails_on_duplicate_name() {
        let mut connection = db::establish_test_connection();

        connection.test_transaction::<_, Error, _>(|connection| {
            super::create(connection, "ayrat".to_string()).unwrap();

            let result = super::create(connection, "ayrat".to_string());

            assert!(result.is_err());

            Ok(())
        });
    }

    #[test]
    #[ignore]
    fn delete_all_removes_every_user() {
        let mut connection = db::establish_test_connection();

        connection.test_transaction::<_, Error, _>(|connection| {
            super::create(connection, "ayrat".to_string()).unwrap();
            super::create(connection, "pavel".to_string()).unwrap();

            super::delete_all(connection).unwrap();

            assert!(super::all(connection).unwrap().is_empty());

            Ok(())
        });
    }
}
