//! Example usage: assemble an engine stack and inspect what it built

use rigging::{
    ContextParams, EngineOptionsBuilder, EngineStack, Environment, FixSuggestion, Vpc,
};

const PARAMS_YAML: &str = r#"
projectName: proj
contextName: demo
userId: u1
outputBucketName: proj-outputs
engine:
  serviceName: engine
  cpu: 512
  memoryLimitMiB: 1024
  containerPort: 8000
  environment:
    WORKFLOW_ROOT: /engine-executions
  image:
    designation: workflow-engine
adapter:
  serviceName: adapter
  cpu: 256
  memoryLimitMiB: 512
  image:
    designation: wes-adapter
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .init();

    let options = EngineOptionsBuilder::new()
        .env(Environment::new("123456789012", "eu-west-1")?)
        .vpc(Vpc::from_id("vpc-0123"))
        .job_queue_ref("queue/default-demo")
        .params(ContextParams::from_yaml(PARAMS_YAML)?)
        .build()?;

    let stack = match EngineStack::new("proj-demo-u1", &options) {
        Ok(stack) => stack,
        Err(e) => {
            eprintln!("Assembly failed: {e}");
            if let Some(suggestion) = e.fix_suggestion() {
                eprintln!("Fix: {suggestion}");
            }
            return Err(e.into());
        }
    };

    println!("=== Resources (creation order) ===\n");
    for record in stack.stack().resources() {
        println!("{:<16} {}", format!("{:?}", record.kind), record.logical_id);
    }

    println!("\n=== Effective task-role policy ===\n");
    for statement in stack.task_role().snapshot().statements {
        println!("{:?} on {:?}", statement.actions, statement.resources);
    }

    let outputs = stack.outputs();
    println!("\n=== Outputs ===\n");
    println!("engine log group:  {}", outputs.engine_log_group.name());
    println!("adapter log group: {}", outputs.adapter_log_group.name());
    println!("access log group:  {}", outputs.access_log_group.name());
    println!("wes url:           {}", outputs.wes_url);

    Ok(())
}
