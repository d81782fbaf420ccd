mod db_test;
mod helpers;
mod nonce_test;
