use std::fmt;

/// 顶层步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    Mode,
    Pre,
    Post,
    Finish,
}

impl FlowStep {
    pub const COUNT: usize = 4;

    /// 从 1 开始的步骤序号（用于“第 n 步，共 4 步”）
    pub fn ordinal(&self) -> usize {
        match self {
            FlowStep::Mode => 1,
            FlowStep::Pre => 2,
            FlowStep::Post => 3,
            FlowStep::Finish => 4,
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStep::Mode => "mode",
            FlowStep::Pre => "pre",
            FlowStep::Post => "post",
            FlowStep::Finish => "finish",
        };
        f.write_str(name)
    }
}

/// 向导响应的按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKey {
    Escape,
}
