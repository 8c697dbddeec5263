//! AWS Lambda function for the Catalyst features API.

use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    catalyst_lambda_features::run().await
}
