//! Python Rendering
//!
//! Serializes a [`DagScript`] into the text of an Airflow DAG module.
//!
//! The plain-import block is always followed by a blank line, even when
//! empty. The `from` import block is omitted entirely when empty.

use std::fmt;

use super::script::{
    ArgValue, Callable, DagScript, DefaultArg, DependencyEdge, OperatorBinding, OperatorNode,
    Statement,
};

/// First line of every generated module.
pub const HEADER: &str = "# DAG created automatically";

/// Airflow imports every generated module needs.
pub const ENGINE_IMPORTS: &[&str] = &[
    "from airflow import DAG",
    "from airflow.operators.python_operator import PythonOperator",
    "from airflow.operators.bash_operator import BashOperator",
];

const INDENT: &str = "    ";

impl DagScript {
    /// Renders the script as Python source.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DagScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        for line in ENGINE_IMPORTS {
            writeln!(f, "{}", line)?;
        }

        for module in &self.imports {
            writeln!(f, "import {}", module)?;
        }
        writeln!(f)?;

        if !self.from_imports.is_empty() {
            for import in &self.from_imports {
                writeln!(f, "from {} import {}", import.module, import.symbol)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "default_args = {{")?;
        for arg in &self.default_args {
            writeln!(f, "{}{},", INDENT, arg)?;
        }
        writeln!(f, "}}")?;
        writeln!(f)?;

        writeln!(
            f,
            "dag = DAG('{}', default_args=default_args, schedule_interval='{}')",
            self.dag.name, self.dag.schedule
        )?;
        writeln!(f, "dag.catchup = {}", self.dag.catchup)?;
        writeln!(f)?;

        for callable in &self.callables {
            write!(f, "{}", callable)?;
            writeln!(f)?;
        }

        for operator in &self.operators {
            writeln!(f, "{}", operator)?;
            writeln!(f)?;
        }

        for edge in &self.edges {
            writeln!(f, "{}", edge)?;
        }

        Ok(())
    }
}

impl fmt::Display for DefaultArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            ArgValue::Quoted(text) => write!(f, "'{}': '{}'", self.key, text),
            ArgValue::Minutes(text) => write!(f, "'{}': timedelta(minutes={})", self.key, text),
            ArgValue::Literal(text) => write!(f, "'{}': {}", self.key, text),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(line) => f.write_str(line),
            Self::Instantiate { var, class_name } => write!(f, "{} = {}()", var, class_name),
            Self::MethodCall { var, method } => write!(f, "{}.{}()", var, method),
            Self::Pass => f.write_str("pass"),
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "def {}(ds, **kwargs):", self.name)?;
        for statement in &self.body {
            f.write_str(INDENT)?;
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for OperatorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            OperatorBinding::Python { callable } => write!(
                f,
                "{} = PythonOperator(task_id='{}', provide_context=True, python_callable={}, dag=dag)",
                self.var, self.task_id, callable
            ),
            OperatorBinding::Bash { command } => write!(
                f,
                "{} = BashOperator(task_id='{}', bash_command='{}', dag=dag)",
                self.var, self.task_id, command
            ),
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.source, self.method, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::translate;
    use crate::workflow::{CallableDef, DagSettings, TaskNode, WorkflowSpec};

    fn sample() -> WorkflowSpec {
        WorkflowSpec::new(DagSettings::new("sample", "@daily", "False"))
            .with_argument("owner", "bob")
            .with_definition(CallableDef::command("say_hi", "print('hi')"))
            .with_task(TaskNode::python("t1", "task_one", "say_hi"))
    }

    #[test]
    fn test_sample_scenario_full_text() {
        let expected = "\
# DAG created automatically
from airflow import DAG
from airflow.operators.python_operator import PythonOperator
from airflow.operators.bash_operator import BashOperator

default_args = {
    'owner': 'bob',
}

dag = DAG('sample', default_args=default_args, schedule_interval='@daily')
dag.catchup = False

def say_hi(ds, **kwargs):
    print('hi')

t1 = PythonOperator(task_id='task_one', provide_context=True, python_callable=say_hi, dag=dag)

";
        assert_eq!(translate(&sample()), expected);
    }

    #[test]
    fn test_empty_imports_still_leave_blank_line() {
        let text = translate(&sample());
        assert!(text.contains("BashOperator\n\ndefault_args = {"));
    }

    #[test]
    fn test_empty_import_from_emits_nothing() {
        let text = translate(&sample());
        assert!(!text.contains("\nfrom datetime"));
        assert!(!text.contains("\n\n\ndefault_args"));
    }

    #[test]
    fn test_import_blocks_in_order() {
        let text = translate(
            &sample()
                .with_import("os")
                .with_import("json")
                .with_import_from("datetime", "timedelta")
                .with_import_from("etl.jobs", "Loader"),
        );

        assert!(text.contains(
            "import os\nimport json\n\nfrom datetime import timedelta\nfrom etl.jobs import Loader\n\ndefault_args"
        ));
        let os_pos = text.find("import os").unwrap();
        let json_pos = text.find("import json").unwrap();
        assert!(os_pos < json_pos);
    }

    #[test]
    fn test_default_args_rendering() {
        let spec = WorkflowSpec::new(DagSettings::new("d", "@daily", "False"))
            .with_argument("owner", "alice")
            .with_argument("retries", 3)
            .with_argument("retry_delay", 5);

        let text = translate(&spec);
        assert!(text.contains(
            "default_args = {\n    'owner': 'alice',\n    'retries': 3,\n    'retry_delay': timedelta(minutes=5),\n}\n"
        ));
    }

    #[test]
    fn test_catchup_emitted_raw() {
        let spec = WorkflowSpec::new(DagSettings::new("d", "@daily", "'no'"));
        assert!(translate(&spec).contains("dag.catchup = 'no'\n"));
    }

    #[test]
    fn test_class_definition_rendering() {
        let spec = sample().with_definition(CallableDef::class(
            "run_etl",
            "Etl",
            vec!["extract".to_string(), "load".to_string()],
        ));

        assert!(translate(&spec).contains(
            "def run_etl(ds, **kwargs):\n    E = Etl()\n    E.extract()\n    E.load()\n\n"
        ));
    }

    #[test]
    fn test_bash_task_rendering() {
        let spec = sample().with_task(TaskNode::bash("t2", "cleanup", "rm -rf /tmp/etl"));
        assert!(translate(&spec)
            .contains("t2 = BashOperator(task_id='cleanup', bash_command='rm -rf /tmp/etl', dag=dag)\n"));
    }

    #[test]
    fn test_links_rendered_after_all_tasks() {
        let spec = sample()
            .with_task(TaskNode::bash("t2", "two", "echo 2").with_link("set_upstream", "t1"))
            .with_task(TaskNode::bash("t3", "three", "echo 3"));
        let text = translate(&spec);

        let link_pos = text.find("t2.set_upstream(t1)").unwrap();
        let last_task_pos = text.find("t3 = BashOperator").unwrap();
        assert!(link_pos > last_task_pos);
        assert!(text.ends_with("t2.set_upstream(t1)\n"));
    }

    #[test]
    fn test_single_downstream_link_statement() {
        let spec = WorkflowSpec::new(DagSettings::new("d", "@daily", "False"))
            .with_task(TaskNode::bash("t1", "one", "ls").with_link("set_downstream", "t2"))
            .with_task(TaskNode::bash("t2", "two", "ls"));
        let text = translate(&spec);

        let links: Vec<&str> = text.lines().filter(|l| l.contains(".set_")).collect();
        assert_eq!(links, vec!["t1.set_downstream(t2)"]);
    }
}
