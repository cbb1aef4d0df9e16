use clap::Parser;

use bmp_bin::{cli::Cli, handler::run};

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据 `-d` 标志执行编码或解码
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();

    run(cli)
}
