//! XJP Deploy Orchestrator - 变更驱动的选择性部署编排器
//!
//! Usage:
//! - Push trigger (git diff): `xjp-deploy-orchestrator`
//! - Explicit paths: `xjp-deploy-orchestrator --changed-paths services/user-service/index.js`
//! - Manual dispatch: `xjp-deploy-orchestrator --event manual --services user-service,order-service`
//! - Everything: `xjp-deploy-orchestrator --event manual --services all`

use xjp_deploy_orchestrator::RuntimeConfig;

/// 解析命令行参数
fn parse_args() -> RuntimeConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--event" if i + 1 < args.len() => {
                config.event = Some(args[i + 1].clone());
                i += 2;
            }
            "--revision" if i + 1 < args.len() => {
                config.revision = Some(args[i + 1].clone());
                i += 2;
            }
            "--changed-paths" if i + 1 < args.len() => {
                config.changed_paths = Some(
                    args[i + 1]
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                );
                i += 2;
            }
            "--services" if i + 1 < args.len() => {
                config.services = Some(args[i + 1].clone());
                i += 2;
            }
            "--max-concurrency" if i + 1 < args.len() => {
                config.max_concurrency = args[i + 1].parse().ok();
                i += 2;
            }
            "--json" => {
                config.json_output = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("XJP Deploy Orchestrator - 变更驱动的选择性部署编排器");
    println!();
    println!("USAGE:");
    println!("    xjp-deploy-orchestrator [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --event <push|manual>        Trigger kind (default: push)");
    println!("    --revision <SHA>             Deploy this revision (default: git HEAD)");
    println!("    --changed-paths <P1,P2,...>  Changed paths (default: git diff HEAD~1..HEAD)");
    println!("    --services <S1,S2|all>       Units for manual dispatch");
    println!("    --max-concurrency <N>        Override the concurrency limit");
    println!("    --json                       Print the summary as JSON");
    println!("    -h, --help                   Print help information");
    println!();
    println!("EXAMPLES:");
    println!("    xjp-deploy-orchestrator                                   # Deploy what changed");
    println!("    xjp-deploy-orchestrator --event manual --services all     # Deploy everything");
    println!("    xjp-deploy-orchestrator --event manual --services user-service");
}

fn main() {
    let config = parse_args();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    let exit_code = rt.block_on(xjp_deploy_orchestrator::init_and_run_pipeline(config));
    std::process::exit(exit_code);
}
